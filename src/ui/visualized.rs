use crate::config::GalaxyConfig;
use crate::session::store::ChatStore;
use crate::session::SessionId;
use crate::theme::Theme;
use crate::ui::galaxy::GalaxyView;
use crate::ui::three_scene::ThreeScene;
use crate::ui::UiAction;
use eframe::egui;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Galaxy,
    Classic,
}

/// Session and question the visible point cloud was requested for.
pub type GalaxyKey = (Option<SessionId>, Option<String>);

pub fn galaxy_key(store: &ChatStore) -> GalaxyKey {
    (
        store.current_session_id(),
        store.current_result().map(|result| result.query.clone()),
    )
}

pub struct VisualizedPage {
    config: GalaxyConfig,
    renderer: Renderer,
    galaxy: GalaxyView,
    classic: Option<ThreeScene>,
    requested: Option<GalaxyKey>,
}

impl VisualizedPage {
    pub fn new(config: GalaxyConfig) -> Self {
        Self {
            galaxy: GalaxyView::new(config.star_count, config.auto_rotate),
            config,
            renderer: Renderer::Galaxy,
            classic: None,
            requested: None,
        }
    }

    /// Returns true when the point cloud for `key` has not been requested yet.
    pub fn needs_fetch(&mut self, key: GalaxyKey) -> bool {
        if key.0.is_none() || self.requested.as_ref() == Some(&key) {
            return false;
        }
        self.requested = Some(key);
        true
    }

    /// Tears down everything mounted by this page; the next visit refetches.
    pub fn unmount(&mut self) {
        self.classic = None;
        self.requested = None;
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        store: &ChatStore,
        theme: &Theme,
        runtime: &Handle,
        actions: &mut Vec<UiAction>,
    ) {
        if self.needs_fetch(galaxy_key(store)) {
            actions.push(UiAction::RefreshGalaxy);
        }

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.renderer, Renderer::Galaxy, "Galaxy view");
            ui.selectable_value(&mut self.renderer, Renderer::Classic, "Classic scene");
        });

        match self.renderer {
            Renderer::Galaxy => {
                self.classic = None;
                self.galaxy.show(ui, store.galaxy(), theme, actions);
            }
            Renderer::Classic => {
                let star_count = self.config.star_count;
                let classic = self
                    .classic
                    .get_or_insert_with(|| ThreeScene::mount(runtime, ui.ctx(), star_count));
                classic.show(ui, store.galaxy(), theme);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{galaxy_key, VisualizedPage};
    use crate::config::GalaxyConfig;
    use crate::event::AppEvent;
    use crate::session::store::ChatStore;
    use crate::session::{QueryResult, SessionId};

    #[test]
    fn fetch_is_requested_once_per_session_and_query() {
        let mut page = VisualizedPage::new(GalaxyConfig::default());
        let mut store = ChatStore::new();

        assert!(!page.needs_fetch(galaxy_key(&store)), "no session yet");

        let id = store.create_new_chat();
        assert!(page.needs_fetch(galaxy_key(&store)));
        assert!(!page.needs_fetch(galaxy_key(&store)));

        store.ask_question("Q");
        store.apply(AppEvent::AnswerReceived {
            session_id: id,
            query: "Q".to_string(),
            result: Ok(QueryResult {
                query: "Q".to_string(),
                answer: "A".to_string(),
                sources: Vec::new(),
                results: Vec::new(),
                query_vector_3d: [0.0; 3],
            }),
        });
        assert!(page.needs_fetch(galaxy_key(&store)), "query changed");

        store.create_new_chat();
        assert!(page.needs_fetch(galaxy_key(&store)), "session changed");
    }

    #[test]
    fn unmount_forces_refetch_on_next_visit() {
        let mut page = VisualizedPage::new(GalaxyConfig::default());
        let key = (Some(SessionId(1)), None);
        assert!(page.needs_fetch(key.clone()));
        page.unmount();
        assert!(page.needs_fetch(key));
    }
}
