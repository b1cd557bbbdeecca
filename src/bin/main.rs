use anyhow::{bail, Context, Error};
use chrono::Utc;
use hormigapp::{
    endpoints::{self, EmailChangeRequest, PasswordChange, PasswordReset},
    format::{format_clp, format_elapsed, BalanceStatus},
    guard, ApiClient, BudgetUpdate, Category, Config, FileStorage, Gateway,
    Guard, NewExpense, NewFixedExpense, Route, SessionManager, SharedExpense,
};
use std::{
    fmt::{self, Debug, Formatter},
    path::PathBuf,
    sync::Arc,
};
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting application with {:#?}", args);

    let mut config = Config::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = &args.session_file {
        config = config.with_session_file(path);
    }
    log::debug!("Using {:?}", config);

    let client = ApiClient::from_config(&config)?;
    let storage = Arc::new(FileStorage::new(&config.session_file));
    let session = SessionManager::new(client, storage);
    session.restore().await;

    run(args.cmd, Gateway::new(session)).await
}

async fn run(cmd: Command, gateway: Gateway) -> Result<(), Error> {
    let session = gateway.session();

    if let Some(route) = cmd.route() {
        match guard(&session.snapshot(), route) {
            Guard::RedirectToLogin => {
                bail!("Not logged in. Run `hormigapp login` first")
            },
            Guard::RedirectHome => {
                bail!("Already logged in. Run `hormigapp logout` first")
            },
            Guard::Render | Guard::Loading => {},
        }
    }

    match cmd {
        Command::Login { username, password } => {
            session.login(&username, &password).await?;

            match session.user() {
                Some(user) => println!("Logged in as {}", user.username),
                None if session.is_authenticated() => {
                    println!("Logged in, but the profile is unavailable")
                },
                None => bail!("The new session was rejected"),
            }
        },
        Command::Register {
            username,
            email,
            password,
            password_confirm,
        } => {
            let confirm = password_confirm.as_deref().unwrap_or(&password);
            session.register(&username, &email, &password, confirm).await?;
            println!("Registered {}. You can log in now.", username);
        },
        Command::Logout => {
            session.logout();
            println!("Logged out");
        },
        Command::Whoami => match session.user() {
            Some(user) => {
                println!("{} <{}>", user.username, user.email);
                if let Some(elapsed) = session.session_elapsed(Utc::now()) {
                    println!("Session: {}", format_elapsed(elapsed));
                }
            },
            None if session.is_authenticated() => {
                println!("Logged in, but the profile is unavailable")
            },
            None => println!("Not logged in"),
        },
        Command::Overview => {
            let (budget, expenses) = tokio::try_join!(
                endpoints::get_budget(&gateway),
                endpoints::get_expenses(&gateway),
            )?;

            println!("Income:    {}", format_clp(budget.monthly_income));
            println!("Goal:      {}", format_clp(budget.savings_goal));
            println!("Fixed:     {}", format_clp(budget.total_fixed_expenses));
            println!("Ant:       {}", format_clp(budget.total_ant_expenses));
            println!(
                "Available: {} ({})",
                format_clp(budget.available_money),
                BalanceStatus::of(budget.available_money)
            );
            println!("{} expenses logged this cycle", expenses.len());
        },
        Command::Budget(BudgetCmd::Show) => {
            let budget = endpoints::get_budget(&gateway).await?;
            println!("{:#?}", budget);
        },
        Command::Budget(BudgetCmd::Set {
            income,
            savings_goal,
            cycle_start_day,
        }) => {
            let update = BudgetUpdate::new(income, savings_goal, cycle_start_day);
            let budget = endpoints::update_budget(&gateway, &update).await?;
            println!(
                "Budget saved, {} available",
                format_clp(budget.available_money)
            );
        },
        Command::Expenses(ExpenseCmd::List) => {
            for expense in endpoints::get_expenses(&gateway).await? {
                println!(
                    "{:>6}  {:>12}  {:<16} {}",
                    expense.id,
                    format_clp(expense.amount),
                    expense.category_display.as_ref().unwrap_or(&expense.category),
                    expense.description.as_deref().unwrap_or(""),
                );
            }
        },
        Command::Expenses(ExpenseCmd::Add {
            amount,
            category,
            description,
        }) => {
            if amount <= 0.0 {
                bail!(hormigapp::FormError::NonPositiveAmount);
            }

            let mut expense = NewExpense::new(amount, category);
            if let Some(description) = description {
                expense = expense.with_description(description);
            }

            let created = endpoints::add_expense(&gateway, &expense).await?;
            println!("Added expense {}", created.id);
        },
        Command::Expenses(ExpenseCmd::Delete { id }) => {
            endpoints::delete_expense(&gateway, id).await?;
            println!("Deleted expense {}", id);
        },
        Command::Fixed(FixedCmd::List) => {
            for fixed in endpoints::get_fixed_expenses(&gateway).await? {
                println!(
                    "{:>6}  {:>12}  {}",
                    fixed.id,
                    format_clp(fixed.amount),
                    fixed.name
                );
            }
        },
        Command::Fixed(FixedCmd::Add { name, amount }) => {
            let fixed = NewFixedExpense { name, amount };
            let created = endpoints::add_fixed_expense(&gateway, &fixed).await?;
            println!("Added fixed expense {}", created.id);
        },
        Command::Fixed(FixedCmd::Delete { id }) => {
            endpoints::delete_fixed_expense(&gateway, id).await?;
            println!("Deleted fixed expense {}", id);
        },
        Command::History(HistoryCmd::List) => {
            for period in endpoints::get_history(&gateway).await? {
                println!(
                    "{:>6}  {} to {}  saved {}",
                    period.id,
                    period.period_start.as_deref().unwrap_or("?"),
                    period.period_end.as_deref().unwrap_or("?"),
                    format_clp(period.saved_amount),
                );
            }
        },
        Command::History(HistoryCmd::Pdf { id, out }) => {
            let pdf = endpoints::download_history_pdf(&gateway, id).await?;
            let out =
                out.unwrap_or_else(|| PathBuf::from(endpoints::pdf_file_name(id)));

            std::fs::write(&out, pdf)
                .with_context(|| format!("Unable to write {}", out.display()))?;
            println!("Saved {}", out.display());
        },
        Command::Split {
            total,
            people,
            category,
            description,
            save,
        } => {
            let split = SharedExpense::parse(&total, &people)?;
            println!(
                "{} between {} is {} each",
                format_clp(split.total() as f64),
                split.people(),
                format_clp(split.share() as f64)
            );

            if save {
                let expense =
                    split.into_expense(category, description.as_deref())?;
                let created = endpoints::add_expense(&gateway, &expense).await?;
                println!("Added expense {}", created.id);
            }
        },
        Command::Password {
            current,
            password,
            password_confirm,
        } => {
            let change =
                PasswordChange::new(&current, &password, &password_confirm)?;
            endpoints::change_password(&gateway, &change).await?;
            println!("Password changed");
        },
        Command::Email {
            new_email,
            password,
        } => {
            let request = EmailChangeRequest::new(&new_email, &password)?;
            let message =
                endpoints::request_email_change(&gateway, &request).await?;
            println!(
                "{}",
                message.as_deref().unwrap_or("Check your inbox to confirm")
            );
        },
        Command::ConfirmEmail { token } => {
            let message =
                endpoints::confirm_email_change(session.client(), &token)
                    .await?;
            println!("{}", message.as_deref().unwrap_or("Email changed"));
        },
        Command::ResetPassword(ResetCmd::Request { email }) => {
            let message =
                endpoints::request_password_reset(session.client(), &email)
                    .await?;
            println!("{}", message.as_deref().unwrap_or("Check your inbox"));
        },
        Command::ResetPassword(ResetCmd::Verify { token }) => {
            endpoints::verify_password_reset(session.client(), &token).await?;
            println!("The link is valid");
        },
        Command::ResetPassword(ResetCmd::Confirm {
            token,
            password,
            password_confirm,
        }) => {
            let reset = PasswordReset::new(&token, &password, &password_confirm)?;
            let message =
                endpoints::confirm_password_reset(session.client(), &reset)
                    .await?;
            println!("{}", message.as_deref().unwrap_or("Password changed"));
        },
        Command::Onboarding { reset } => {
            endpoints::set_onboarding_seen(&gateway, !reset).await?;
            let seen = session.user().map(|u| u.has_seen_onboarding);
            println!("Onboarding seen: {:?}", seen);
        },
    }

    Ok(())
}

#[derive(StructOpt)]
#[structopt(about = "Track your ant expenses from the command line")]
struct Args {
    #[structopt(long, help = "The backend's base URL")]
    api_url: Option<String>,
    #[structopt(
        long,
        parse(from_os_str),
        help = "Where the session is kept between runs"
    )]
    session_file: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Debug for Args {
    /// Only the subcommand's name is shown, its arguments may be passwords.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("api_url", &self.api_url)
            .field("session_file", &self.session_file)
            .field("cmd", &self.cmd.name())
            .finish()
    }
}

#[derive(StructOpt)]
enum Command {
    /// Log in and remember the session.
    Login { username: String, password: String },
    /// Create an account.
    Register {
        username: String,
        email: String,
        password: String,
        #[structopt(long, help = "Defaults to the password")]
        password_confirm: Option<String>,
    },
    Logout,
    /// Show who is logged in.
    Whoami,
    /// The budget at a glance.
    Overview,
    Budget(BudgetCmd),
    Expenses(ExpenseCmd),
    Fixed(FixedCmd),
    History(HistoryCmd),
    /// Split a bill and optionally log your share.
    Split {
        total: String,
        #[structopt(default_value = "2")]
        people: String,
        #[structopt(short, long, default_value = "otros")]
        category: Category,
        #[structopt(short, long)]
        description: Option<String>,
        #[structopt(long, help = "Log your share as an expense")]
        save: bool,
    },
    /// Change your password.
    Password {
        current: String,
        password: String,
        password_confirm: String,
    },
    /// Ask for your email to be changed.
    Email { new_email: String, password: String },
    /// Finish an email change using the token from the email.
    ConfirmEmail { token: String },
    ResetPassword(ResetCmd),
    /// Mark the onboarding tour as seen.
    Onboarding {
        #[structopt(long, help = "Show the tour again")]
        reset: bool,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Logout => "logout",
            Command::Whoami => "whoami",
            Command::Overview => "overview",
            Command::Budget(_) => "budget",
            Command::Expenses(_) => "expenses",
            Command::Fixed(_) => "fixed",
            Command::History(_) => "history",
            Command::Split { .. } => "split",
            Command::Password { .. } => "password",
            Command::Email { .. } => "email",
            Command::ConfirmEmail { .. } => "confirm-email",
            Command::ResetPassword(_) => "reset-password",
            Command::Onboarding { .. } => "onboarding",
        }
    }

    fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } | Command::Register { .. } => {
                Some(Route::Public)
            },
            Command::Logout
            | Command::Whoami
            | Command::ConfirmEmail { .. }
            | Command::ResetPassword(_) => None,
            _ => Some(Route::Private),
        }
    }
}

#[derive(StructOpt)]
enum BudgetCmd {
    Show,
    Set {
        income: i64,
        savings_goal: i64,
        #[structopt(default_value = "1")]
        cycle_start_day: i64,
    },
}

#[derive(StructOpt)]
enum ExpenseCmd {
    List,
    Add {
        amount: f64,
        #[structopt(default_value = "otros")]
        category: Category,
        description: Option<String>,
    },
    Delete { id: u64 },
}

#[derive(StructOpt)]
enum FixedCmd {
    List,
    Add { name: String, amount: i64 },
    Delete { id: u64 },
}

#[derive(StructOpt)]
enum HistoryCmd {
    List,
    /// Download a period's statement.
    Pdf {
        id: u64,
        #[structopt(long, parse(from_os_str))]
        out: Option<PathBuf>,
    },
}

#[derive(StructOpt)]
enum ResetCmd {
    /// Email yourself a reset link.
    Request { email: String },
    /// Check a reset link's token.
    Verify { token: String },
    Confirm {
        token: String,
        password: String,
        password_confirm: String,
    },
}
