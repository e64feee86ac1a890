//! Application layer
//!
//! Contains use cases and service orchestration.
//! Each service implements `RequestHandler` once per request type: queries
//! return a lazy `Query`, mutations return a `CommandResponse`.

pub mod city_service;
pub mod command;
pub mod country_service;
pub mod location_service;
pub mod seed_service;
pub mod user_service;

pub use city_service::{
    CityCreateRequest, CityDeleteRequest, CityQueryRequest, CityService, CityUpdateRequest,
};
pub use command::{CommandResponse, RequestHandler};
pub use country_service::{
    CountryCreateRequest, CountryDeleteRequest, CountryQueryRequest, CountryService,
    CountryUpdateRequest,
};
pub use location_service::{
    LocationInnerJoinRequest, LocationLeftJoinRequest, LocationQueryRequest, LocationService,
};
pub use seed_service::{LocationSeedRequest, SeedResponse, SeedService, UserSeedRequest};
pub use user_service::{UserLocationQueryRequest, UserQueryRequest, UserService};
