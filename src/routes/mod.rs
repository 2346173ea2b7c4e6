//! Screen handlers, one module per route.

pub mod clear_config;
pub mod exit;
pub mod help;
pub mod home;
pub mod install;
pub mod run;
pub mod update;

use crate::router::{Navigator, Route};

pub use clear_config::ClearConfigRoute;
pub use exit::ExitRoute;
pub use help::HelpRoute;
pub use home::HomeRoute;
pub use install::InstallRoute;
pub use run::RunRoute;
pub use update::UpdateRoute;

/// Registers the handler for every [`Route`].
pub fn register_all(nav: &mut Navigator) -> &mut Navigator {
    nav.register_route(Route::Home, HomeRoute)
        .register_route(Route::Run, RunRoute)
        .register_route(Route::Install, InstallRoute)
        .register_route(Route::Update, UpdateRoute)
        .register_route(Route::ClearConfig, ClearConfigRoute)
        .register_route(Route::Help, HelpRoute)
        .register_route(Route::Exit, ExitRoute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;

    #[test]
    fn test_every_route_has_a_handler() {
        let mut h = Harness::new(vec![]);
        register_all(&mut h.navigator);

        for route in Route::ALL {
            assert!(h.navigator.has_route(route), "{route} is not registered");
        }
    }
}
