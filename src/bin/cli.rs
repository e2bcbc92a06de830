use clap::{Parser, Subcommand};
use coursehub::cli::{create_admin, list_admins};
use coursehub::coursehub_db::init_db_pool;
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::SqlitePool;

#[derive(Parser)]
#[command(name = "coursehub-cli")]
#[command(about = "CourseHub CLI - Administrative tools for CourseHub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new admin account
    CreateAdmin {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// List existing admin accounts
    ListAdmins,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => fail(format!("Failed to connect to database: {}", e)),
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        fail(format!("Failed to run migrations: {}", e));
    }

    match cli.command {
        Commands::CreateAdmin {
            username,
            name,
            password,
        } => handle_create_admin(&pool, username, name, password).await,
        Commands::ListAdmins => handle_list_admins(&pool).await,
    }
}

async fn handle_create_admin(
    pool: &SqlitePool,
    username: Option<String>,
    name: Option<String>,
    password: Option<String>,
) {
    // Use provided values or prompt interactively
    let username = match username {
        Some(username) => username,
        None => prompt_text("Username"),
    };

    let name = match name {
        Some(name) => name,
        None => prompt_text("Display name"),
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail(format!("Failed to read password: {}", e))),
    };

    match create_admin(pool, &username, &name, &password).await {
        Ok(user) => {
            println!("\n✅ Admin created successfully!");
            println!("   Username: {}", user.username);
            println!("   Name: {}", user.name);
        }
        Err(e) => fail(format!("Error creating admin: {}", e.error)),
    }
}

async fn handle_list_admins(pool: &SqlitePool) {
    match list_admins(pool).await {
        Ok(admins) if admins.is_empty() => println!("No admin accounts. Run create-admin first."),
        Ok(admins) => {
            for admin in admins {
                println!(
                    "{:<24} {:<32} created {}",
                    admin.username,
                    admin.name,
                    admin.created_at.format("%Y-%m-%d")
                );
            }
        }
        Err(e) => fail(format!("Error listing admins: {}", e.error)),
    }
}

fn prompt_text(prompt: &str) -> String {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .unwrap_or_else(|e| fail(format!("Failed to read {}: {}", prompt.to_lowercase(), e)))
}

fn fail(message: String) -> ! {
    eprintln!("\n❌ {}", message);
    std::process::exit(1);
}
