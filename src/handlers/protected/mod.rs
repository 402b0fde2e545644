// handlers/protected/mod.rs - Protected handlers (session token required)
//
// Every handler here runs behind `jwt_auth_middleware` and takes the
// caller's `Identity` from the request extensions. Ownership checks happen
// in the services, not here.
pub mod form;
pub mod notes;
pub mod tags;
pub mod users;
