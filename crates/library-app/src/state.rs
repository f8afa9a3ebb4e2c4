use std::sync::Arc;

use library_dal::Pool;

use crate::menu::Menu;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(pool: Pool, menu: &'static Menu) -> Self {
        AppState {
            state: Arc::new(AppStateInner { pool, menu }),
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn menu(&self) -> &'static Menu {
        self.state.menu
    }
}

struct AppStateInner {
    pool: Pool,
    menu: &'static Menu,
}
