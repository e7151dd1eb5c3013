use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use hireloop_api::models::JobQuery;
use hireloop_auth::{
    complete_oauth_sign_in, sign_out, FlowState, GoogleOAuth, OtpFlow, Portal, ResendOutcome,
    SignInFlow, SignInForm, SignUpFlow, SignUpForm,
};
use hireloop_config::load as load_config;
use hireloop_dashboard::{AdminUserDirectory, ChatHistory, JobBoard, SubscriptionView};
use hireloop_realtime::{Effect, NoticeBoard, NoticeLevel, RoomMembership, SendError};
use hireloop_runtime::{shutdown_signal, telemetry, ClientServices};
use hireloop_session::{decode_claims, gate, Gate, Route, SessionStorage};

const DEFAULT_TOKEN_STORE: &str = ".hireloop/tokens.json";

#[derive(Parser)]
#[command(name = "hireloop")]
#[command(about = "Hireloop client: sign in, follow notifications and chat from a terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account; a one-time code is sent by email
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Enter the emailed code (type `resend` for a new one)
    VerifyOtp,
    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Use the admin portal
        #[arg(long)]
        admin: bool,
    },
    /// Sign in with Google
    Google,
    /// End the stored session
    Signout,
    /// Show the signed-in identity
    Whoami,
    /// Stay connected and print live notifications
    Listen,
    /// Join a chat room and send stdin lines to `to`
    Chat {
        #[arg(long)]
        room: String,
        #[arg(long)]
        to: String,
    },
    /// Search open jobs
    Jobs {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Show the current plan and payments
    Subscription,
    /// Admin: list users
    AdminUsers {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let mut config = load_config().context("failed to load configuration")?;
    if config.auth.token_store_path.is_none() {
        config.auth.token_store_path = Some(DEFAULT_TOKEN_STORE.to_string());
    }
    let services =
        ClientServices::initialise(&config).context("failed to initialise client services")?;

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            signup(
                &services,
                SignUpForm {
                    name,
                    email,
                    password,
                    confirm_password,
                },
            )
            .await
        }
        Commands::VerifyOtp => verify_otp(&services).await,
        Commands::Signin {
            email,
            password,
            admin,
        } => {
            let portal = if admin { Portal::Admin } else { Portal::User };
            signin(&services, portal, SignInForm { email, password }).await
        }
        Commands::Google => google(&services).await,
        Commands::Signout => {
            let route = sign_out(&services.session)?;
            println!("Signed out. Next: {}", route.path());
            Ok(())
        }
        Commands::Whoami => whoami(&services),
        Commands::Listen => listen(services).await,
        Commands::Chat { room, to } => chat(services, room, to).await,
        Commands::Jobs { search, location } => jobs(&services, search, location).await,
        Commands::Subscription => subscription(&services).await,
        Commands::AdminUsers { search, page } => admin_users(&services, search, page).await,
    }
}

fn report(state: &FlowState) -> anyhow::Result<Route> {
    match state {
        FlowState::Completed { redirect } => Ok(*redirect),
        FlowState::Idle { error, fields } => {
            for (field, message) in fields.iter() {
                eprintln!("{field:?}: {message}");
            }
            match error {
                Some(error) => bail!("{error}"),
                None => bail!("please fix the fields above"),
            }
        }
        FlowState::Submitting => bail!("request still in flight"),
    }
}

/// Stop early when the stored tokens do not allow `route`.
fn require(services: &ClientServices, route: Route) -> anyhow::Result<()> {
    match gate(route, services.session.storage().as_ref()) {
        Gate::Render => Ok(()),
        Gate::Redirect(to) => bail!("not signed in: continue at {}", to.path()),
    }
}

async fn signup(services: &ClientServices, form: SignUpForm) -> anyhow::Result<()> {
    let mut flow = SignUpFlow::new(services.api.clone(), services.session.clone());
    let route = report(flow.submit(&form).await)?;
    println!("Check your inbox for the code, then run `hireloop verify-otp` ({}).", route.path());
    Ok(())
}

async fn verify_otp(services: &ClientServices) -> anyhow::Result<()> {
    require(services, Route::VerifyOtp)?;

    let mut flow = OtpFlow::new(
        services.api.clone(),
        services.session.clone(),
        services.config.auth.otp_resend_cooldown(),
    );

    println!("Enter the 6-digit code, or `resend` for a new one.");
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let input = line.trim();
        if input == "resend" {
            match flow.resend().await {
                ResendOutcome::Sent(message) => println!("{message}"),
                ResendOutcome::CoolingDown { remaining_secs } => {
                    println!("You can request a new code in {remaining_secs}s")
                }
                ResendOutcome::Failed(message) => eprintln!("{message}"),
            }
            continue;
        }

        flow.input_mut().clear();
        if !flow.input_mut().paste(input) {
            println!("The code is 6 digits.");
            continue;
        }

        match report(flow.submit().await) {
            Ok(route) => {
                println!("Account verified. Sign in next ({}).", route.path());
                return Ok(());
            }
            Err(err) => eprintln!("{err}"),
        }
    }
}

async fn signin(services: &ClientServices, portal: Portal, form: SignInForm) -> anyhow::Result<()> {
    let mut flow = SignInFlow::new(services.api.clone(), services.session.clone(), portal);
    let route = report(flow.submit(&form).await)?;
    println!("Signed in. Next: {}", route.path());
    Ok(())
}

async fn google(services: &ClientServices) -> anyhow::Result<()> {
    let Some(oauth) = GoogleOAuth::from_config(&services.config.auth.google)? else {
        bail!("google sign-in is not configured (auth.google.*)");
    };

    let pending = oauth.authorize();
    println!("Open this URL and paste `<code> <state>` from the redirect:");
    println!("{}", pending.url);

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let mut parts = line.split_whitespace();
    let (Some(code), Some(state)) = (parts.next(), parts.next()) else {
        bail!("expected `<code> <state>`");
    };

    let identity = oauth.exchange(&pending, code, state).await?;
    let route = complete_oauth_sign_in(&services.api, &services.session, &identity).await?;
    println!("Signed in as {}. Next: {}", identity.email, route.path());
    Ok(())
}

fn whoami(services: &ClientServices) -> anyhow::Result<()> {
    let Some(user) = services.session.current() else {
        println!("Not signed in.");
        if services.session.signup_token().is_some() {
            println!("A sign-up is waiting for its code: run `hireloop verify-otp`.");
        }
        return Ok(());
    };

    println!("{} <{}> ({:?}, id {})", user.name, user.email, user.role, user.id);
    let claims = services
        .session
        .storage()
        .get(user.role.token_key())
        .and_then(|token| decode_claims(&token));
    if let Some(expires) = claims
        .and_then(|claims| claims.exp)
        .and_then(|exp| chrono::DateTime::<chrono::Utc>::from_timestamp(exp, 0))
    {
        println!("Token expires {}", expires.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

async fn listen(mut services: ClientServices) -> anyhow::Result<()> {
    require(&services, Route::Notifications)?;

    let mut effects = services
        .take_effects()
        .context("effects receiver already taken")?;
    let watcher = services.connection.watch_session(services.session.context());
    let mut notifications = services.stores.notifications.subscribe();
    let mut notices = services.stores.notices.subscribe();
    let mut seen_notifications = 0;
    let mut seen_notice = 0;

    println!("Listening, Ctrl+C to stop.");
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(Effect::Redirect(route)) = effects.recv() => {
                // The forced-logout notice is pushed just before the redirect.
                print_notices(&services.stores.notices, &mut seen_notice);
                println!("Signed out by the server. Continue at {}", route.path());
                break;
            }
            changed = notifications.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = notifications.borrow_and_update().clone();
                for notification in state.items.iter().skip(seen_notifications) {
                    println!(
                        "[{}] {}",
                        notification.timestamp.format("%H:%M"),
                        notification.message
                    );
                }
                seen_notifications = state.items.len();
            }
            changed = notices.changed() => {
                if changed.is_err() {
                    break;
                }
                notices.borrow_and_update();
                print_notices(&services.stores.notices, &mut seen_notice);
            }
        }
    }

    watcher.abort();
    services.connection.close().await;
    info!("listener stopped");
    Ok(())
}

fn print_notices(board: &NoticeBoard, seen: &mut u64) {
    for notice in board.since(*seen) {
        match notice.level {
            NoticeLevel::Info => println!("* {}", notice.message),
            NoticeLevel::Error => eprintln!("! {}", notice.message),
        }
        *seen = notice.id;
    }
}

async fn chat(services: ClientServices, room: String, to: String) -> anyhow::Result<()> {
    require(&services, Route::Messages)?;
    let user = services.session.current().context("no signed-in identity")?;

    let history = ChatHistory::new(services.api.clone(), services.stores.chat.clone());
    history.load(&room).await.context("failed to load chat history")?;
    for message in services.stores.chat.messages(&room) {
        let who = if message.sender_id == user.id { "you" } else { message.sender_id.as_str() };
        println!("[{}] {who}: {}", message.timestamp.format("%H:%M"), message.content);
    }

    services
        .connection
        .connect((&user).into())
        .await
        .context("failed to connect to the realtime channel")?;
    let membership = RoomMembership::mount(services.connection.clone(), room.as_str());
    let emitter = services.emitter();

    let mut incoming = services.stores.chat.subscribe();
    let mut seen = services.stores.chat.messages(&room).len();
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        tokio::select! {
            read = reader.read_line(&mut line) => {
                if read? == 0 {
                    break;
                }
                match emitter.send(&room, &to, &line) {
                    Ok(_) => {}
                    Err(SendError::EmptyMessage) => {}
                    Err(err) => eprintln!("{err}"),
                }
                line.clear();
            }
            changed = incoming.changed() => {
                if changed.is_err() {
                    break;
                }
                let messages = incoming.borrow_and_update().messages(&room).to_vec();
                for message in messages.iter().skip(seen) {
                    if message.sender_id != user.id {
                        println!("{}: {}", message.sender_id, message.content);
                    }
                }
                seen = messages.len();
            }
        }
    }

    drop(membership);
    services.connection.close().await;
    Ok(())
}

async fn jobs(
    services: &ClientServices,
    search: Option<String>,
    location: Option<String>,
) -> anyhow::Result<()> {
    require(services, Route::Jobs)?;

    let board = JobBoard::new(services.api.clone(), services.config.search.debounce());
    board
        .load(JobQuery {
            search,
            location,
            page: None,
        })
        .await
        .context("failed to load jobs")?;

    let listing = board.listing();
    if listing.jobs.is_empty() {
        println!("No jobs found");
    }
    for job in &listing.jobs {
        println!(
            "{:<26} {:<30} {:<20} {:<15} {} questions",
            job.id,
            job.title,
            job.company,
            job.location,
            job.questions.len()
        );
    }
    if listing.has_more {
        println!("More results available.");
    }
    Ok(())
}

async fn subscription(services: &ClientServices) -> anyhow::Result<()> {
    require(services, Route::Subscription)?;

    let view = SubscriptionView::new(services.api.clone());
    let data = view.refresh().await.context("failed to load subscription")?;
    let now = chrono::Utc::now();

    println!(
        "Plan: {:?} ({:?}), {}",
        data.plan_type,
        data.billing_cycle,
        if data.is_current(now) { "active" } else { "inactive" }
    );
    if let Some(end) = data.end_date {
        println!("Renews or ends {}", end.format("%Y-%m-%d"));
    }
    for payment in &data.payment_history {
        println!(
            "  {} {:>10.2} {} {:?}",
            payment.date.format("%Y-%m-%d"),
            payment.amount,
            payment.currency,
            payment.status
        );
    }
    println!("Total paid: {:.2}", data.total_paid());
    Ok(())
}

async fn admin_users(services: &ClientServices, search: String, page: u32) -> anyhow::Result<()> {
    require(services, Route::AdminUsers)?;

    let directory =
        AdminUserDirectory::new(services.api.clone(), services.config.search.debounce());
    directory
        .load(&search, page)
        .await
        .context("failed to list users")?;

    let state = directory.snapshot();
    println!("{:<26} {:<25} {:<32} {:<10} {}", "ID", "Name", "Email", "Role", "Blocked");
    for user in &state.users {
        println!(
            "{:<26} {:<25} {:<32} {:<10} {}",
            user.id,
            user.name,
            user.email,
            format!("{:?}", user.role),
            if user.blocked { "yes" } else { "no" }
        );
    }
    println!("Page {} of {}", state.page, state.total_pages.max(1));
    Ok(())
}
