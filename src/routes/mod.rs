/// Router Module Index
///
/// Splits the routing surface by access requirement, so the authentication
/// layer is applied explicitly at the module boundary rather than handler by
/// handler.

/// Routes accessible to anonymous clients: health, registration, login.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware: everything
/// touching content records and uploads.
pub mod authenticated;
