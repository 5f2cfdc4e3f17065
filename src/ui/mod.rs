use crate::session::SessionId;
use std::path::PathBuf;

pub mod about;
pub mod galaxy;
pub mod home;
pub mod result;
pub mod search;
pub mod sidebar;
pub mod three_scene;
pub mod visualized;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Result,
    Visualized,
    About,
    Search,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Result => "Answer",
            Self::Visualized => "Knowledge Galaxy",
            Self::About => "About",
            Self::Search => "Vector Search",
        }
    }
}

/// User intent collected while rendering a frame; the app applies these after
/// the panels are drawn so pages only ever read the store.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Navigate(Page),
    Back,
    NewChat,
    SelectChat(SessionId),
    DeleteChat(SessionId),
    DeleteAllChats,
    RenameChat(SessionId, String),
    LaunchFiles(Vec<PathBuf>),
    Ask(String),
    RefreshGalaxy,
    Search(String, u32),
    OpenUrl(String),
}

/// Splits a free-form path list (newlines, commas or semicolons) into paths.
pub fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_path_list;
    use std::path::PathBuf;

    #[test]
    fn parse_path_list_handles_mixed_separators() {
        let paths = parse_path_list(" /tmp/a.pdf,\n/tmp/b.pptx ; ;\n\n");
        assert_eq!(
            paths,
            vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.pptx")]
        );
        assert!(parse_path_list("   ").is_empty());
    }
}
