//! Per-thread override of the client used by the resource operations.
//!
//! # Design
//! The override slot is thread-local, so independent threads that install
//! different clients never see each other's. Installation is scoped: a drop
//! guard puts back exactly what was there before (including "nothing"), on
//! normal return, on `Err`, and on unwind.

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::{ApiClient, Client};
use crate::config;
use crate::error::Result;

thread_local! {
    static ACTIVE_CLIENT: RefCell<Option<Rc<dyn ApiClient>>> = const { RefCell::new(None) };
}

/// The override currently installed on this thread, if any.
pub fn active_client() -> Option<Rc<dyn ApiClient>> {
    ACTIVE_CLIENT.with(|slot| slot.borrow().clone())
}

/// Run `body` with a resolved client.
///
/// With `Some(client)`, that client is installed as this thread's override
/// for the duration of `body` and the previous slot value is restored
/// afterwards. With `None`, the process-wide configuration is validated
/// first, then `body` receives the installed override or, when there is
/// none, a fresh [`Client`] built from the process-wide configuration.
pub fn with_client<T, F>(client: Option<Rc<dyn ApiClient>>, body: F) -> Result<T>
where
    F: FnOnce(&dyn ApiClient) -> Result<T>,
{
    match client {
        Some(client) => {
            let _restore = ClientOverride::install(Rc::clone(&client));
            body(client.as_ref())
        }
        None => {
            config::configuration().validate()?;
            let client: Rc<dyn ApiClient> = match active_client() {
                Some(active) => active,
                None => Rc::new(Client::from_global()),
            };
            body(client.as_ref())
        }
    }
}

struct ClientOverride {
    previous: Option<Rc<dyn ApiClient>>,
}

impl ClientOverride {
    fn install(client: Rc<dyn ApiClient>) -> Self {
        let previous = ACTIVE_CLIENT.with(|slot| slot.borrow_mut().replace(client));
        Self { previous }
    }
}

impl Drop for ClientOverride {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // Drop the outgoing client after the borrow ends.
        let _outgoing = ACTIVE_CLIENT.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), previous));
    }
}
