use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    bootstrap::{BootstrapController, ShellPhase, ShellView},
    enforcer::NavigationEnforcer,
    login_marker::{self, MemoryTabStorage},
    session::Session,
};

/// TabError
///
/// Why a tab-scoped operation could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabError {
    /// The tab has never mounted the shell, or has been evicted.
    UnknownTab,
    /// The tab exists but currently has no mounted shell.
    NotMounted,
    /// The callback belongs to a mount that has since been replaced or unmounted.
    StaleMount,
}

/// TabView
///
/// A rendered shell for one tab, plus the redirect the enforcer demands, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub mount_id: Uuid,
    pub location: String,
    pub view: ShellView,
    pub redirect_to: Option<String>,
}

// Everything one mount of the shell owns. Dropped with the mount.
struct ShellState {
    controller: BootstrapController,
    enforcer: NavigationEnforcer,
    location: String,
}

struct Mount {
    id: Uuid,
    shell: Arc<Mutex<ShellState>>,
    watchdog: Option<JoinHandle<()>>,
}

impl Drop for Mount {
    fn drop(&mut self) {
        if let Some(handle) = self.watchdog.take() {
            handle.abort();
        }
    }
}

struct Tab {
    storage: MemoryTabStorage,
    mount: Option<Mount>,
    last_seen: DateTime<Utc>,
}

impl Tab {
    fn new() -> Self {
        Self {
            storage: MemoryTabStorage::new(),
            mount: None,
            last_seen: Utc::now(),
        }
    }

    fn current_mount(&mut self) -> Result<&mut Mount, TabError> {
        self.last_seen = Utc::now();
        self.mount.as_mut().ok_or(TabError::NotMounted)
    }
}

/// TabRegistry
///
/// Holds the per-tab state the shell needs across requests: the tab's ephemeral storage and
/// its current mount. Each mount owns one bootstrap controller and one navigation enforcer.
///
/// Locking: the registry lock is taken first, then a mount's shell lock. The loader
/// watchdog only ever takes the shell lock, and only through a weak handle, so a timer
/// that outlives its mount does nothing.
pub struct TabRegistry {
    tabs: Mutex<HashMap<Uuid, Tab>>,
    landing_route: String,
    loading_max: Duration,
}

/// TabRegistryState
///
/// Shared handle to the registry, held in `AppState`.
pub type TabRegistryState = Arc<TabRegistry>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TabRegistry {
    pub fn new(landing_route: impl Into<String>, loading_max: Duration) -> Self {
        Self {
            tabs: Mutex::new(HashMap::new()),
            landing_route: landing_route.into(),
            loading_max,
        }
    }

    pub fn landing_route(&self) -> &str {
        &self.landing_route
    }

    /// mark_login
    ///
    /// Records in the tab's storage that the next mount follows a successful login.
    pub fn mark_login(&self, tab_id: Uuid) {
        let mut tabs = lock(&self.tabs);
        let tab = tabs.entry(tab_id).or_insert_with(Tab::new);
        tab.last_seen = Utc::now();
        login_marker::mark(&mut tab.storage);
    }

    /// mount
    ///
    /// Starts a new page lifetime for the tab, replacing (and cancelling) any previous mount.
    /// The login marker is consumed before the first view is rendered.
    pub fn mount(&self, tab_id: Uuid, location: &str, session: &Session) -> TabView {
        let mut tabs = lock(&self.tabs);
        let tab = tabs.entry(tab_id).or_insert_with(Tab::new);
        tab.last_seen = Utc::now();

        let controller = BootstrapController::mount(&mut tab.storage);
        tracing::debug!(
            tab_id = %tab_id,
            came_from_login = controller.is_transitioning(),
            "Mounting shell"
        );

        // Assigning drops the previous mount, which aborts its watchdog.
        let mount = tab.mount.insert(Mount {
            id: Uuid::new_v4(),
            shell: Arc::new(Mutex::new(ShellState {
                controller,
                enforcer: NavigationEnforcer::new(self.landing_route.clone()),
                location: location.to_string(),
            })),
            watchdog: None,
        });

        self.change_location(mount, location, session)
    }

    /// unmount
    ///
    /// Ends the tab's current page lifetime. Pending timers are cancelled. Returns false if
    /// nothing was mounted.
    pub fn unmount(&self, tab_id: Uuid) -> bool {
        let mut tabs = lock(&self.tabs);
        let Some(tab) = tabs.get_mut(&tab_id) else {
            return false;
        };
        tab.last_seen = Utc::now();
        tab.mount.take().is_some()
    }

    /// view
    ///
    /// Re-evaluates the shell at the tab's current location.
    pub fn view(&self, tab_id: Uuid, session: &Session) -> Result<TabView, TabError> {
        let mut tabs = lock(&self.tabs);
        let mount = tabs
            .get_mut(&tab_id)
            .ok_or(TabError::UnknownTab)?
            .current_mount()?;
        Ok(self.render(mount, None, None, session))
    }

    /// navigate
    ///
    /// Moves the tab to `path` and runs the navigation enforcer. If the enforcer redirects,
    /// the tab's location becomes the landing route while the returned view still shows what
    /// rendered at `path`.
    pub fn navigate(&self, tab_id: Uuid, path: &str, session: &Session) -> Result<TabView, TabError> {
        let mut tabs = lock(&self.tabs);
        let mount = tabs
            .get_mut(&tab_id)
            .ok_or(TabError::UnknownTab)?
            .current_mount()?;
        Ok(self.change_location(mount, path, session))
    }

    /// transition_complete
    ///
    /// The post-login animation of `mount_id` finished.
    pub fn transition_complete(
        &self,
        tab_id: Uuid,
        mount_id: Uuid,
        session: &Session,
    ) -> Result<TabView, TabError> {
        self.with_mount(tab_id, mount_id, session, |controller| {
            controller.transition_complete()
        })
    }

    /// loading_complete
    ///
    /// The loader of `mount_id` reported completion before the fallback timer fired.
    pub fn loading_complete(
        &self,
        tab_id: Uuid,
        mount_id: Uuid,
        session: &Session,
    ) -> Result<TabView, TabError> {
        self.with_mount(tab_id, mount_id, session, |controller| {
            controller.loading_complete()
        })
    }

    /// evict_idle
    ///
    /// Drops tabs not seen for `ttl`, cancelling their timers. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let cutoff = Utc::now() - ttl;

        let mut tabs = lock(&self.tabs);
        let before = tabs.len();
        tabs.retain(|_, tab| tab.last_seen >= cutoff);
        let evicted = before - tabs.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle tabs");
        }
        evicted
    }

    pub fn tab_count(&self) -> usize {
        lock(&self.tabs).len()
    }

    fn with_mount(
        &self,
        tab_id: Uuid,
        mount_id: Uuid,
        session: &Session,
        signal: impl FnOnce(&mut BootstrapController),
    ) -> Result<TabView, TabError> {
        let mut tabs = lock(&self.tabs);
        let mount = tabs
            .get_mut(&tab_id)
            .ok_or(TabError::UnknownTab)?
            .current_mount()
            .map_err(|_| TabError::StaleMount)?;
        if mount.id != mount_id {
            return Err(TabError::StaleMount);
        }

        signal(&mut lock(&mount.shell).controller);
        Ok(self.render(mount, None, None, session))
    }

    fn change_location(&self, mount: &mut Mount, path: &str, session: &Session) -> TabView {
        let redirect = {
            let mut shell = lock(&mount.shell);
            shell.location = path.to_string();
            let redirect = shell.enforcer.on_change(path, session);
            if let Some(redirect) = &redirect {
                shell.location = redirect.to.clone();
            }
            redirect
        };
        self.render(mount, Some(path), redirect.map(|r| r.to), session)
    }

    // Renders at `rendered_at` (the requested path, even when redirecting) or else at the
    // current location, and keeps the loader watchdog in step with the rendered phase.
    fn render(
        &self,
        mount: &mut Mount,
        rendered_at: Option<&str>,
        redirect_to: Option<String>,
        session: &Session,
    ) -> TabView {
        let (view, location) = {
            let shell = lock(&mount.shell);
            let at = rendered_at.unwrap_or(shell.location.as_str());
            let view = shell.controller.render(session, at, self.loading_max);
            (view, shell.location.clone())
        };

        self.sync_watchdog(mount, view.phase());

        TabView {
            mount_id: mount.id,
            location,
            view,
            redirect_to,
        }
    }

    // The watchdog exists exactly while the loader is on screen, like a timer owned by the
    // loader itself.
    fn sync_watchdog(&self, mount: &mut Mount, phase: ShellPhase) {
        let loading = phase == ShellPhase::Loading;
        let armed = mount.watchdog.is_some();

        if loading && !armed {
            let shell = Arc::downgrade(&mount.shell);
            mount.watchdog = Some(spawn_watchdog(shell, mount.id, self.loading_max));
        } else if !loading && armed {
            if let Some(handle) = mount.watchdog.take() {
                handle.abort();
            }
        }
    }
}

fn spawn_watchdog(shell: Weak<Mutex<ShellState>>, mount_id: Uuid, max: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(max).await;
        // The mount is gone: nothing to update.
        let Some(shell) = shell.upgrade() else {
            return;
        };
        let mut shell = lock(&shell);
        if !shell.controller.is_loader_done() {
            tracing::debug!(mount_id = %mount_id, "Loader fallback timer fired");
            shell.controller.loading_complete();
        }
    })
}
