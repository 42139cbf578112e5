use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use planilla_be::Config;
use planilla_be::database::{
    init_database,
    repositories::{BusinessRepository, EmployeeRepository, PaymentRepository, TimeLogRepository},
};
use planilla_be::handlers::{business, employees, import, payments, payroll, time_logs};
use planilla_be::services::{
    ImportService, LogOnlySender, NotificationSender, PayrollService, SettlementService,
    TimeEntryService,
};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Planilla API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories and services
    let business_repository = BusinessRepository::new(pool.clone());
    let employee_repository = EmployeeRepository::new(pool.clone());
    let time_log_repository = TimeLogRepository::new(pool.clone());
    let payment_repository = PaymentRepository::new(pool.clone());

    // Delivery is owned by an external integration; the engine only builds
    // summaries, so the default sender just logs them.
    let notifier: Arc<dyn NotificationSender> = Arc::new(LogOnlySender);

    let payroll_service = PayrollService::new(
        time_log_repository.clone(),
        employee_repository.clone(),
        business_repository.clone(),
    );
    let settlement_service = SettlementService::new(
        pool.clone(),
        payment_repository.clone(),
        time_log_repository.clone(),
        employee_repository.clone(),
        notifier.clone(),
    );
    let time_entry_service = TimeEntryService::new(
        pool.clone(),
        time_log_repository.clone(),
        employee_repository.clone(),
        notifier.clone(),
    );
    let import_service = ImportService::new(
        pool.clone(),
        employee_repository.clone(),
        payment_repository.clone(),
    );

    let notifier_data: web::Data<dyn NotificationSender> = web::Data::from(notifier.clone());
    let business_repo_data = web::Data::new(business_repository);
    let employee_repo_data = web::Data::new(employee_repository);
    let time_log_repo_data = web::Data::new(time_log_repository);
    let payment_repo_data = web::Data::new(payment_repository);
    let payroll_data = web::Data::new(payroll_service);
    let settlement_data = web::Data::new(settlement_service);
    let time_entry_data = web::Data::new(time_entry_service);
    let import_data = web::Data::new(import_service);

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(notifier_data.clone())
            .app_data(business_repo_data.clone())
            .app_data(employee_repo_data.clone())
            .app_data(time_log_repo_data.clone())
            .app_data(payment_repo_data.clone())
            .app_data(payroll_data.clone())
            .app_data(settlement_data.clone())
            .app_data(time_entry_data.clone())
            .app_data(import_data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", "Accept", "X-Business-Id"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/settings")
                            .route("/business", web::get().to(business::get_settings))
                            .route("/business", web::put().to(business::update_settings)),
                    )
                    .service(
                        web::scope("/employees")
                            .route("", web::get().to(employees::list_employees))
                            .route("", web::post().to(employees::create_employee))
                            .route("/auth", web::post().to(employees::authenticate_pin))
                            .route("/{id}", web::get().to(employees::get_employee))
                            .route("/{id}", web::put().to(employees::update_employee))
                            .route("/{id}", web::delete().to(employees::delete_employee)),
                    )
                    .service(
                        web::scope("/logs")
                            .route("", web::get().to(time_logs::list_logs))
                            .route("", web::post().to(time_logs::create_log))
                            .route("/batch", web::post().to(time_logs::submit_batch))
                            .route("/{id}", web::put().to(time_logs::update_log))
                            .route("/{id}", web::delete().to(time_logs::delete_log))
                            .route(
                                "/employee/{employee_id}",
                                web::delete().to(time_logs::delete_employee_logs),
                            ),
                    )
                    .service(
                        web::scope("/payments")
                            .route("", web::get().to(payments::list_payments))
                            .route("/{id}", web::get().to(payments::get_payment))
                            .route("/{id}", web::delete().to(payments::delete_payment))
                            .route(
                                "/{id}/lines/{index}",
                                web::put().to(payments::edit_paid_line),
                            )
                            .route(
                                "/{id}/adjustments",
                                web::post().to(payments::adjust_payment),
                            ),
                    )
                    .service(
                        web::scope("/payroll")
                            .route("/pending", web::get().to(payroll::pending_summary))
                            .route(
                                "/pending/{employee_id}/share",
                                web::post().to(payroll::share_pending),
                            )
                            .route("/settle", web::post().to(payroll::settle))
                            .route("/settle-line", web::post().to(payroll::settle_line)),
                    )
                    .service(
                        web::scope("/import")
                            .route("/resolve", web::post().to(import::resolve))
                            .route("/execute", web::post().to(import::execute)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
