//! Route paths.

pub const POST_USER_REGISTER: &str = "/api/user/register";
pub const POST_USER_LOGIN: &str = "/api/user/login";
pub const GET_USER_CURRENT: &str = "/api/user/current";
pub const POST_USER_LOGOUT: &str = "/api/user/logout";
pub const GET_USER_SEARCH: &str = "/api/user/search";
pub const DELETE_USER_ID: &str = "/api/user/{id}";
