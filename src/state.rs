use crate::dispatch::policy::RadiusPolicy;
use crate::observability::metrics::Metrics;
use crate::store::{OrderStore, RestaurantStore, RiderStore, UserStore};

pub struct AppState {
    pub users: UserStore,
    pub riders: RiderStore,
    pub orders: OrderStore,
    pub restaurants: RestaurantStore,
    pub dispatch: RadiusPolicy,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(dispatch: RadiusPolicy) -> Self {
        Self {
            users: UserStore::new(),
            riders: RiderStore::new(),
            orders: OrderStore::new(),
            restaurants: RestaurantStore::new(),
            dispatch,
            metrics: Metrics::new(),
        }
    }
}
