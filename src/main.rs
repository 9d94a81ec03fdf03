mod attendance;
mod auth;
mod cli;
mod dashboard;
mod db;
mod error;
mod exams;
mod fees;
mod fmt;
mod homework;
mod messages;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod school;
mod settings;
mod store;
mod students;
mod subjects;
mod timetable;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{
    AttendanceCommands, Cli, Commands, ExamsCommands, FeesCommands, HomeworkCommands, MessagesCommands,
    ReportCommands, SettingsCommands, StudentsCommands, SubjectsCommands, TimetableCommands,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DUGSI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dugsi", &mut std::io::stdout());
            Ok(())
        }
        Commands::Login { email, password } => cli::auth::login(&email, password),
        Commands::Logout => cli::auth::logout(),
        Commands::Whoami => cli::auth::whoami(),
        Commands::Students { command } => match command {
            StudentsCommands::Add {
                name,
                class,
                guardian,
                phone,
                relationship,
            } => cli::students::add(&name, &class, &guardian, &phone, &relationship),
            StudentsCommands::List { search, class } => {
                cli::students::list(search.as_deref(), class.as_deref())
            }
            StudentsCommands::Show { id } => cli::students::show(&id),
            StudentsCommands::Edit {
                id,
                name,
                class,
                guardian,
                phone,
                relationship,
                status,
            } => cli::students::edit(&id, name, class, guardian, phone, relationship, status),
            StudentsCommands::Delete { id, yes } => cli::students::delete(&id, yes),
        },
        Commands::Fees { command } => match command {
            FeesCommands::List { month, search } => cli::fees::list(month, search.as_deref()),
            FeesCommands::Pay {
                student,
                amount,
                month,
                method,
                reference,
            } => cli::fees::pay(&student, amount, month, &method, &reference),
            FeesCommands::Update {
                student,
                month,
                due,
                paid,
            } => cli::fees::update(&student, &month, due, paid),
            FeesCommands::History { student } => cli::fees::history(&student),
        },
        Commands::Attendance { command } => match command {
            AttendanceCommands::Mark { student, status, date } => {
                cli::attendance::mark(&student, &status, date)
            }
            AttendanceCommands::Stats { date } => cli::attendance::stats(date),
            AttendanceCommands::Week { class, end } => cli::attendance::week(class.as_deref(), end),
        },
        Commands::Exams { command } => match command {
            ExamsCommands::Add { name, date, term } => cli::exams::add(&name, &date, &term),
            ExamsCommands::List => cli::exams::list(),
            ExamsCommands::Delete { id, yes } => cli::exams::delete(id, yes),
            ExamsCommands::Grade {
                exam,
                student,
                subject,
                score,
            } => cli::exams::grade(exam, &student, &subject, score),
            ExamsCommands::Grades { exam, subject } => cli::exams::grades(exam, &subject),
        },
        Commands::Subjects { command } => match command {
            SubjectsCommands::Add { name, code, teacher } => cli::subjects::add(&name, &code, &teacher),
            SubjectsCommands::List => cli::subjects::list(),
            SubjectsCommands::Edit {
                id,
                name,
                code,
                teacher,
            } => cli::subjects::edit(id, name, code, teacher),
            SubjectsCommands::Delete { id, yes } => cli::subjects::delete(id, yes),
        },
        Commands::Report { command } => match command {
            ReportCommands::View { term, class } => cli::report::view(&term, &class),
            ReportCommands::Export {
                term,
                class,
                format,
                output,
            } => cli::report::export(&term, &class, format, output),
        },
        Commands::Dashboard => cli::dashboard::run(),
        Commands::Homework { command } => match command {
            HomeworkCommands::Add {
                title,
                class,
                subject,
                due,
                description,
            } => cli::homework::add(&title, &class, &subject, &due, &description),
            HomeworkCommands::List { class } => cli::homework::list(class.as_deref()),
            HomeworkCommands::Status { id, status } => cli::homework::status(id, &status),
        },
        Commands::Messages { command } => match command {
            MessagesCommands::Send { to, message, method } => cli::messages::send(&to, &message, &method),
            MessagesCommands::List => cli::messages::list(),
        },
        Commands::Timetable { command } => match command {
            TimetableCommands::Add {
                class,
                day,
                period,
                subject,
                teacher,
            } => cli::timetable::add(&class, &day, period, &subject, &teacher),
            TimetableCommands::List { class } => cli::timetable::list(&class),
            TimetableCommands::Remove { id } => cli::timetable::remove(id),
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => cli::settings::show(),
            SettingsCommands::Set { key, value } => cli::settings::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
