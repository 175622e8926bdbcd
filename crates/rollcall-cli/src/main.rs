use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rollcall", version, about = "Attendance, points and follow-up for weekly meetings")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roster management
    Member {
        #[command(subcommand)]
        action: commands::member::MemberAction,
    },
    /// Record a member's arrival
    Checkin(commands::checkin::CheckinArgs),
    /// Attendance records and reports
    Attendance {
        #[command(subcommand)]
        action: commands::attendance::AttendanceAction,
    },
    /// Balances and redemptions
    Points {
        #[command(subcommand)]
        action: commands::points::PointsAction,
    },
    /// Gift catalog management
    Gift {
        #[command(subcommand)]
        action: commands::gift::GiftAction,
    },
    /// Rank members by points earned
    Leaderboard(commands::leaderboard::LeaderboardArgs),
    /// Members who missed recent meetings
    Absentees(commands::absentees::AbsenteesArgs),
    /// Follow-up notes for absent members
    Followup {
        #[command(subcommand)]
        action: commands::followup::FollowupAction,
    },
    /// Meeting agenda
    Agenda {
        #[command(subcommand)]
        action: commands::agenda::AgendaAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Export or restore all data as JSON
    Backup {
        #[command(subcommand)]
        action: commands::backup::BackupAction,
    },
    /// Pick a random member among today's attendees
    Pick,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Member { action } => commands::member::run(action),
        Commands::Checkin(args) => commands::checkin::run(args),
        Commands::Attendance { action } => commands::attendance::run(action),
        Commands::Points { action } => commands::points::run(action),
        Commands::Gift { action } => commands::gift::run(action),
        Commands::Leaderboard(args) => commands::leaderboard::run(args),
        Commands::Absentees(args) => commands::absentees::run(args),
        Commands::Followup { action } => commands::followup::run(action),
        Commands::Agenda { action } => commands::agenda::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Backup { action } => commands::backup::run(action),
        Commands::Pick => commands::pick::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "rollcall", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
