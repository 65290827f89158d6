//! Logical RPC endpoint names.
//!
//! Every remote operation the gateway can invoke is listed here. The names are
//! mapped onto broker topics by the RPC transport.

/// Create a user.
pub const USERS_CREATE: &str = "users.create";
/// Look a user up by username and password.
pub const USERS_GET_BY_CREDENTIALS: &str = "users.getByUsernameAndPassword";
/// Look a user up by ID.
pub const USERS_GET_BY_ID: &str = "users.getById";
/// Create a product.
pub const PRODUCTS_CREATE: &str = "products.create";
/// List all products.
pub const PRODUCTS_LIST: &str = "products.list";
/// Create an order.
pub const ORDERS_CREATE: &str = "orders.create";
/// List the orders of one user.
pub const ORDERS_LIST: &str = "orders.list";

/// All endpoints known to the gateway.
pub const ALL: &[&str] = &[
    USERS_CREATE,
    USERS_GET_BY_CREDENTIALS,
    USERS_GET_BY_ID,
    PRODUCTS_CREATE,
    PRODUCTS_LIST,
    ORDERS_CREATE,
    ORDERS_LIST,
];

/// Returns `true` if `name` is a registered endpoint.
#[must_use]
pub fn is_known(name: &str) -> bool {
    ALL.contains(&name)
}
