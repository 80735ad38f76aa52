//! Access to the authenticated caller stored by the auth middleware.

use krua_app::auth::Principal;
use salvo::prelude::{Depot, StatusError};

pub(crate) trait PrincipalExt {
    fn insert_principal(&mut self, principal: Principal);

    fn principal_or_401(&self) -> Result<&Principal, StatusError>;
}

impl PrincipalExt for Depot {
    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal_or_401(&self) -> Result<&Principal, StatusError> {
        self.obtain::<Principal>()
            .map_err(|_missing| StatusError::unauthorized())
    }
}
