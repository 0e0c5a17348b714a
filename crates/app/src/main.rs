//! Vaxline CLI

use std::{path::PathBuf, process, sync::Arc};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vaxline_app::{
    auth::{PgAuthService, TokenKey, service::AuthConfig},
    context::{AppContext, AppSettings},
    database,
    gateway::{GatewayConfig, GatewaySecret, HttpPaymentGateway},
    http, jobs,
    mail::{ConsoleMailer, Mailer, SmtpConfig, SmtpMailer},
};

#[derive(Debug, Parser)]
#[command(name = "vaxline", about = "Vaccination clinic backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API and the periodic sweeps.
    Serve(ServeArgs),

    Admin(AdminCommand),
}

#[derive(Debug, Args)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// Create the initial admin account. Refuses once any account exists.
    Create(CreateAdminArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Socket address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:4000")]
    bind: String,

    /// Server-side HMAC key for bearer tokens
    #[arg(long, env = "TOKEN_KEY")]
    token_key: String,

    /// Base URL embedded in password-reset emails
    #[arg(
        long,
        env = "RESET_BASE_URL",
        default_value = "http://localhost:3000/reset-password"
    )]
    reset_base_url: String,

    /// Directory for generated booking QR images; skipped when omitted
    #[arg(long, env = "QR_DIR")]
    qr_dir: Option<PathBuf>,

    /// SMTP relay host; emails are logged to the console when omitted
    #[arg(long, env = "SMTP_SERVER")]
    smtp_server: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME", default_value = "")]
    smtp_username: String,

    #[arg(long, env = "SMTP_PASSWORD", default_value = "")]
    smtp_password: String,

    #[arg(long, env = "MAIL_FROM_EMAIL", default_value = "noreply@vaxline.local")]
    mail_from_email: String,

    #[arg(long, env = "MAIL_FROM_NAME", default_value = "Vaxline")]
    mail_from_name: String,

    /// Payment gateway API base URL
    #[arg(long, env = "GATEWAY_ENDPOINT")]
    gateway_endpoint: String,

    #[arg(long, env = "GATEWAY_PARTNER_CODE")]
    gateway_partner_code: String,

    #[arg(long, env = "GATEWAY_PARTNER_NAME", default_value = "Vaxline")]
    gateway_partner_name: String,

    #[arg(long, env = "GATEWAY_STORE_ID", default_value = "VaxlineStore")]
    gateway_store_id: String,

    #[arg(long, env = "GATEWAY_ACCESS_KEY")]
    gateway_access_key: String,

    #[arg(long, env = "GATEWAY_SECRET_KEY")]
    gateway_secret_key: String,

    /// Where the gateway sends the payer after checkout
    #[arg(long, env = "GATEWAY_REDIRECT_URL")]
    gateway_redirect_url: String,

    /// Publicly reachable URL of the IPN callback route
    #[arg(long, env = "GATEWAY_IPN_URL")]
    gateway_ipn_url: String,
}

#[derive(Debug, Args)]
struct CreateAdminArgs {
    /// Admin email address
    #[arg(long)]
    email: String,

    /// Admin password
    #[arg(long)]
    password: String,

    /// Display name
    #[arg(long, default_value = "Admin")]
    name: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "TOKEN_KEY")]
    token_key: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Admin(AdminCommand {
            command: AdminSubcommand::Create(args),
        }) => create_admin(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    let mailer: Arc<dyn Mailer> = match &args.smtp_server {
        Some(server) => Arc::new(SmtpMailer::new(SmtpConfig {
            server: server.clone(),
            port: args.smtp_port,
            username: args.smtp_username.clone(),
            password: args.smtp_password.clone(),
            from_email: args.mail_from_email.clone(),
            from_name: args.mail_from_name.clone(),
        })),
        None => {
            warn!("no SMTP server configured; emails will be logged, not sent");
            Arc::new(ConsoleMailer)
        }
    };

    let gateway = Arc::new(HttpPaymentGateway::new(args.gateway_endpoint.clone()));

    let settings = AppSettings {
        auth: AuthConfig {
            token_key: TokenKey::new(args.token_key),
            reset_base_url: args.reset_base_url,
        },
        gateway: GatewayConfig {
            endpoint: args.gateway_endpoint,
            partner_code: args.gateway_partner_code,
            partner_name: args.gateway_partner_name,
            store_id: args.gateway_store_id,
            access_key: args.gateway_access_key,
            secret_key: GatewaySecret::new(args.gateway_secret_key),
            redirect_url: args.gateway_redirect_url,
            ipn_url: args.gateway_ipn_url,
        },
        qr_dir: args.qr_dir,
    };

    let context = AppContext::new(pool, mailer, gateway, settings);

    let (expiry, reminders) = jobs::spawn_sweeps(
        Arc::clone(&context.bookings),
        Arc::clone(&context.notifications),
    );

    let app = http::router(context);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .map_err(|error| format!("failed to bind {}: {error}", args.bind))?;

    info!(addr = %args.bind, "listening");

    let served = axum::serve(listener, app)
        .await
        .map_err(|error| format!("server error: {error}"));

    expiry.abort();
    reminders.abort();

    served
}

async fn create_admin(args: CreateAdminArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    let service = PgAuthService::new(
        pool,
        Arc::new(ConsoleMailer),
        AuthConfig {
            token_key: TokenKey::new(args.token_key),
            reset_base_url: String::new(),
        },
    );

    let admin = service
        .bootstrap_admin(&args.email, &args.password, &args.name)
        .await
        .map_err(|error| format!("failed to create admin account: {error}"))?;

    info!(email = %admin.email, "admin account created");

    Ok(())
}
