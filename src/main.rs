mod auth;
mod clients;
mod database;
mod error;
mod geo;
mod handlers;
mod models;
mod presence;
mod workflows;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::env;

use crate::clients::auth_admin::AuthAdminClient;
use crate::clients::mailer::Mailer;
use crate::database::Database;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    let bind_address = format!("{}:{}", host, port);

    let database_url = env::var("DATABASE_URL").map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DATABASE_URL must be set in environment",
        )
    })?;

    let db = Database::connect(&database_url).await.map_err(|err| {
        log::error!("Failed to initialize database: {err:?}");
        std::io::Error::new(std::io::ErrorKind::Other, err)
    })?;

    // The settings singleton must exist before the first request reads it.
    match db.ensure_app_settings().await {
        Ok(settings) => log::info!("App settings ready for \"{}\"", settings.site_name),
        Err(err) => log::error!("Failed to ensure app settings: {err:?}"),
    }

    presence::spawn_staleness_sweeper(db.clone());

    let mailer = web::Data::new(Mailer::new(env::var("MAIL_RELAY_URL").ok()));
    let auth_admin = web::Data::new(AuthAdminClient::new(
        env::var("AUTH_ADMIN_URL").ok(),
        env::var("AUTH_ADMIN_TOKEN").ok(),
    ));
    let db_data = web::Data::new(db);

    log::info!("🚀 Starting Baladi Community Service on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(db_data.clone())
            .app_data(mailer.clone())
            .app_data(auth_admin.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                web::scope("/api/v1")
                    // Health
                    .service(handlers::health_check)
                    // Profiles
                    .service(handlers::profiles::create_profile)
                    .service(handlers::profiles::get_my_profile)
                    .service(handlers::profiles::update_my_profile)
                    .service(handlers::profiles::delete_my_account)
                    // Notifications
                    .service(handlers::profiles::list_my_notifications)
                    .service(handlers::profiles::unread_notification_count)
                    .service(handlers::profiles::mark_all_notifications_read)
                    .service(handlers::profiles::mark_notification_read)
                    .service(handlers::profiles::delete_notification)
                    // Promotion & subscription requests
                    .service(handlers::profiles::create_promotion_request)
                    .service(handlers::profiles::list_my_promotion_requests)
                    .service(handlers::profiles::delete_promotion_request)
                    .service(handlers::profiles::create_subscription_request)
                    .service(handlers::profiles::list_my_subscription_requests)
                    .service(handlers::profiles::delete_subscription_request)
                    .service(handlers::profiles::list_my_transactions)
                    // Reminders
                    .service(handlers::profiles::create_reminder)
                    .service(handlers::profiles::list_my_reminders)
                    .service(handlers::profiles::mark_reminder_done)
                    .service(handlers::profiles::delete_reminder)
                    // Businesses
                    .service(handlers::content::create_business)
                    .service(handlers::content::list_businesses)
                    .service(handlers::misc::list_business_reviews)
                    .service(handlers::content::get_business)
                    .service(handlers::content::update_business)
                    .service(handlers::content::delete_business)
                    // Jobs
                    .service(handlers::content::create_job)
                    .service(handlers::content::list_jobs)
                    .service(handlers::content::close_job)
                    .service(handlers::content::get_job)
                    .service(handlers::content::update_job)
                    .service(handlers::content::delete_job)
                    // Events
                    .service(handlers::content::create_event)
                    .service(handlers::content::list_events)
                    .service(handlers::content::cancel_event)
                    .service(handlers::content::get_event)
                    .service(handlers::content::update_event)
                    .service(handlers::content::delete_event)
                    // Marketplace
                    .service(handlers::content::create_market_item)
                    .service(handlers::content::list_market_items)
                    .service(handlers::content::set_market_item_status)
                    .service(handlers::content::get_market_item)
                    .service(handlers::content::update_market_item)
                    .service(handlers::content::delete_market_item)
                    // Lost & found
                    .service(handlers::content::create_lost_item)
                    .service(handlers::content::list_lost_items)
                    .service(handlers::content::mark_lost_item_reunited)
                    .service(handlers::content::get_lost_item)
                    .service(handlers::content::update_lost_item)
                    .service(handlers::content::delete_lost_item)
                    // Donations
                    .service(handlers::content::create_donation)
                    .service(handlers::content::list_donations)
                    .service(handlers::content::contribute_to_donation)
                    .service(handlers::content::close_donation)
                    .service(handlers::content::get_donation)
                    .service(handlers::content::delete_donation)
                    // Reviews
                    .service(handlers::misc::create_review)
                    .service(handlers::misc::delete_review)
                    // Presence
                    .service(handlers::presence::update_location)
                    .service(handlers::presence::nearby_agents)
                    .service(handlers::presence::nearby_drivers)
                    // Site content, emergency numbers, settings, activity
                    .service(handlers::misc::list_site_content)
                    .service(handlers::misc::upsert_site_content)
                    .service(handlers::misc::get_site_content)
                    .service(handlers::misc::delete_site_content)
                    .service(handlers::misc::list_emergency_services)
                    .service(handlers::misc::create_emergency_service)
                    .service(handlers::misc::delete_emergency_service)
                    .service(handlers::misc::get_app_settings)
                    .service(handlers::misc::record_activity)
                    // Workflows
                    .service(handlers::admin::approve_content)
                    .service(handlers::admin::approve_promotion)
                    .service(handlers::admin::reject_promotion)
                    .service(handlers::admin::approve_subscription)
                    .service(handlers::admin::update_user_role)
                    .service(handlers::admin::process_transaction)
                    .service(handlers::admin::broadcast_notifications)
                    .service(handlers::admin::notify_admins_content)
                    .service(handlers::admin::notify_admins_role_request)
                    .service(handlers::admin::notify_admins_subscription_request)
                    // Admin views & moderation
                    .service(handlers::admin::list_users)
                    .service(handlers::admin::set_kyc_status)
                    .service(handlers::admin::set_review_status)
                    .service(handlers::admin::list_promotion_requests)
                    .service(handlers::admin::list_subscription_requests)
                    .service(handlers::admin::list_transactions)
                    .service(handlers::admin::set_transaction_status)
                    .service(handlers::admin::update_app_settings)
                    .service(handlers::admin::list_activity),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
