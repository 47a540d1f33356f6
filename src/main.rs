use std::io;

use actix_cors::Cors;
use actix_web::{guard, web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campusboard::handlers::{admin, auth, events, organizations};
use campusboard::middleware::RequireAuth;
use campusboard::models::user::Role;
use campusboard::security::jwt;
use campusboard::uploads;
use campusboard::Config;

async fn health_check(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "campusboard",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting campusboard v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Database connection failed: {e}")))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;

    tracing::info!("Database connection pool initialized");

    jwt::initialize(&config.jwt_secret)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JWT key init failed: {e}")))?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on {}", bind_address);

    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config.clone());

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config.cors_allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health_check))
            .route("/uploads/{filename}", web::get().to(uploads::serve_upload))
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .service(
                        web::resource("/update-password")
                            .wrap(RequireAuth::any())
                            .route(web::post().to(auth::update_password)),
                    ),
            )
            .service(
                web::scope("/api/events")
                    // Literal paths must register before the {id} routes
                    .service(
                        web::resource("/my")
                            .wrap(RequireAuth::roles(&[Role::Organizer]))
                            .route(web::get().to(events::list_mine)),
                    )
                    .service(
                        web::resource("/pending/all")
                            .wrap(RequireAuth::roles(&[Role::Admin]))
                            .route(web::get().to(events::list_pending)),
                    )
                    .service(
                        web::resource("/bookmarked")
                            .wrap(RequireAuth::any())
                            .route(web::get().to(events::bookmarked)),
                    )
                    // Same path, different guard per method: resource-level
                    // method guards let the public GET and the organizer POST
                    // coexist at the scope root
                    .service(
                        web::resource("")
                            .guard(guard::Get())
                            .route(web::get().to(events::list_approved)),
                    )
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(RequireAuth::roles(&[Role::Organizer]))
                            .route(web::post().to(events::create_event)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .wrap(RequireAuth::roles(&[Role::Admin]))
                            .route(web::put().to(events::decide)),
                    )
                    .service(
                        web::resource("/{id}/bookmark")
                            .wrap(RequireAuth::any())
                            .route(web::post().to(events::toggle_bookmark)),
                    )
                    .service(
                        web::resource("/{id}/register")
                            .wrap(RequireAuth::any())
                            .route(web::post().to(events::register)),
                    )
                    .service(
                        web::resource("/{id}/registrations")
                            .wrap(RequireAuth::any())
                            .route(web::get().to(events::registrations)),
                    )
                    .route("/{id}", web::get().to(events::get_event)),
            )
            .service(
                web::scope("/api/organizations")
                    .service(
                        web::resource("/followed/me")
                            .wrap(RequireAuth::any())
                            .route(web::get().to(organizations::followed)),
                    )
                    .service(
                        web::resource("")
                            .guard(guard::Get())
                            .route(web::get().to(organizations::list)),
                    )
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(RequireAuth::roles(&[Role::Organizer]))
                            .route(web::post().to(organizations::create_organization)),
                    )
                    .service(
                        web::resource("/{id}/follow")
                            .wrap(RequireAuth::any())
                            .route(web::post().to(organizations::toggle_follow)),
                    )
                    .route("/{id}", web::get().to(organizations::get_organization)),
            )
            .service(
                web::scope("/api/admin")
                    .wrap(RequireAuth::roles(&[Role::Admin]))
                    .service(
                        web::resource("/users")
                            .route(web::get().to(admin::list_users))
                            .route(web::post().to(admin::create_user)),
                    )
                    .service(
                        web::resource("/users/{id}")
                            .route(web::put().to(admin::update_user))
                            .route(web::delete().to(admin::delete_user)),
                    )
                    .route("/stats", web::get().to(admin::stats))
                    .route("/recent-activity", web::get().to(admin::recent_activity)),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
