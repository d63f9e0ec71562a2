//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Health check
//!
//! # Auth
//! POST /api/login                               - Login, returns bearer token
//! POST /api/register                            - Register account (superadmin)
//!
//! # Users (superadmin)
//! GET    /api/users                             - List accounts
//! PUT    /api/users/{id}                        - Update account
//! PATCH  /api/users/{id}/active                 - Activate/deactivate account
//! DELETE /api/users/{id}                        - Delete account
//!
//! # Configurations (authenticated, owner-scoped)
//! POST   /api/configurations                    - Connect a store (starts 7-day trial)
//! GET    /api/configurations                    - List own configurations
//! GET    /api/configurations/{id}               - Fetch own configuration
//! PUT    /api/configurations/{id}               - Update own configuration
//! DELETE /api/configurations/{id}               - Delete own configuration
//! GET    /api/user/{user_id}/configurations     - List by user (public)
//! GET    /api/configuration/by-store/{store_id} - Subscription check (public)
//!
//! # Layer designs (superadmin, owner-scoped to caller)
//! POST   /api/layerdesigns                      - Create design
//! GET    /api/layerdesigns                      - List own designs
//! GET    /api/layerdesigns/sqs                  - Distinct group keys
//! GET    /api/layerdesigns/by-sq/{sq}           - List designs in a group
//! DELETE /api/layerdesigns/by-sq/{sq}           - Delete a group
//! PUT    /api/layerdesigns/bulk-update-sq       - Rename a group
//! GET    /api/layerdesigns/{id}                 - Fetch design
//! PUT    /api/layerdesigns/{id}                 - Update design
//! DELETE /api/layerdesigns/{id}                 - Delete design
//! POST   /api/layerdesigns/{id}/customize       - Append customizable entry
//!
//! # Products (public)
//! POST /api/save-product                        - Persist customization document
//! GET  /api/products                            - List saved products
//! GET  /api/products/{id}                       - Fetch saved product
//!
//! # Uploads (superadmin)
//! POST /api/upload                              - Relay file to object storage
//! ```

pub mod auth;
pub mod configurations;
pub mod layer_designs;
pub mod products;
pub mod upload;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create the full `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(configurations::routes())
        .merge(layer_designs::routes())
        .merge(products::routes())
        .merge(upload::routes())
}
