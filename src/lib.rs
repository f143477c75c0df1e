pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::checkout::CheckoutService;
use application::orders::OrderHistoryService;
use application::session::SessionManager;
use domain::ports::StorefrontStore;

pub use db::{create_pool, DbPool};
pub use infrastructure::diesel_store::DieselStore;
pub use infrastructure::memory::MemoryStore;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Shared per-process state: the backing store, the services over it, and
/// the session registry. Built once and cloned into every worker.
pub struct AppState<S: StorefrontStore> {
    pub store: S,
    pub checkout: CheckoutService<S>,
    pub orders: OrderHistoryService<S>,
    pub sessions: SessionManager,
}

impl<S: StorefrontStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            checkout: CheckoutService::new(store.clone()),
            orders: OrderHistoryService::new(store.clone()),
            sessions: SessionManager::new(),
            store,
        }
    }
}

/// Build and return an actix-web `Server` bound to `host:port`, serving the
/// storefront over any [`StorefrontStore`] implementation.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server<S: StorefrontStore>(
    store: S,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(AppState::new(store));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register::<S>))
                    .route("/login", web::post().to(handlers::auth::login::<S>))
                    .route("/logout", web::post().to(handlers::auth::logout::<S>)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products::<S>))
                    .route("/{id}", web::get().to(handlers::products::get_product::<S>)),
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::get_cart::<S>))
                    .route("/items", web::post().to(handlers::cart::add_item::<S>))
                    .service(
                        web::resource("/items/{product_id}")
                            .route(web::put().to(handlers::cart::update_item::<S>))
                            .route(web::delete().to(handlers::cart::remove_item::<S>)),
                    ),
            )
            .route("/checkout", web::post().to(handlers::checkout::checkout::<S>))
            .route("/orders", web::get().to(handlers::orders::list_orders::<S>))
    })
    .bind((host.to_string(), port))?
    .run())
}
