use clap::Parser;
use clap::error::ErrorKind;
use sleepmate_cli::cli::{self, Cli, Command, SleepCommand, TaskCommand};
use sleepmate_core::config::{self, Config};
use sleepmate_core::error::AppError;
use sleepmate_core::model::{Task, TaskColor, Weekday};
use sleepmate_core::planner::Planner;
use sleepmate_core::storage::json_store::JsonFileStore;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SleepRow {
    #[tabled(rename = "Day")]
    day: &'static str,
    #[tabled(rename = "Hours")]
    hours: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Time")]
    time: String,
}

fn task_time_label(task: &Task) -> String {
    match (task.start_time(), task.end_time()) {
        (Some(start), Some(end)) => format!("{start} ~ {end}"),
        (Some(start), None) => format!("{start} ~"),
        (None, Some(end)) => format!("~ {end}"),
        (None, None) => "-".to_string(),
    }
}

fn print_tasks_plain(date: &str, tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks on {date}");
        return;
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            title: task.title.clone(),
            color: task.color.clone(),
            time: task_time_label(task),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{date}");
    println!("{table}");
}

fn print_task_json(task: Option<&Task>) {
    println!("{}", serde_json::json!(task));
}

fn print_task_outcome(json: bool, verb: &str, id: &str, task: Option<&Task>) {
    if json {
        print_task_json(task);
        return;
    }
    match task {
        Some(task) => println!(
            "{verb} task: {} ({}) {}",
            task.title,
            task.id,
            task_time_label(task)
        ),
        None => println!("No task with id {}", id.trim()),
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        log::warn!("using default configuration: {err}");
    }
    let overrides =
        cli::collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn run_sleep(
    planner: &mut Planner<JsonFileStore>,
    command: SleepCommand,
    json: bool,
) -> Result<(), AppError> {
    match command {
        SleepCommand::Set { day, start, end } => {
            let day: Weekday = day.parse()?;
            let record = planner.record_sleep(day, &start, &end)?;
            let hours = planner.weekly_durations()[day.index()];
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "day": day,
                        "start": record.start,
                        "end": record.end,
                        "hours": hours,
                    })
                );
            } else {
                println!(
                    "Recorded sleep for {day}: {} ~ {} ({hours:.1} h)",
                    start.trim(),
                    end.trim()
                );
            }
        }
        SleepCommand::Show => {
            let durations = planner.weekly_durations();
            let stats = planner.weekly_stats();
            if json {
                let days: Vec<serde_json::Value> = Weekday::ALL
                    .iter()
                    .map(|day| {
                        serde_json::json!({ "day": day, "hours": durations[day.index()] })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "days": days,
                        "average": stats.average,
                        "best": stats.best,
                        "worst": stats.worst,
                    })
                );
            } else {
                let rows: Vec<SleepRow> = Weekday::ALL
                    .iter()
                    .map(|day| SleepRow {
                        day: day.label(),
                        hours: format!("{:.1}", durations[day.index()]),
                    })
                    .collect();
                let mut table = Table::new(rows);
                table.with(Style::sharp());
                println!("{table}");
                println!("Average sleep: {} h", stats.average);
                println!("Most sleep: {}", stats.best);
                println!("Least sleep: {}", stats.worst);
            }
        }
        SleepCommand::Status => {
            let status = planner.today_status();
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "status": status, "message": status.message() })
                );
            } else {
                println!("{}", status.message());
            }
        }
        SleepCommand::Reset { yes } => {
            if !yes {
                return Err(AppError::invalid_input(
                    "resetting sleep records cannot be undone; pass --yes to confirm",
                ));
            }
            planner.reset_sleep()?;
            if json {
                println!("{}", serde_json::json!({ "reset": true }));
            } else {
                println!("Sleep records cleared");
            }
        }
    }

    Ok(())
}

fn run_task(
    planner: &mut Planner<JsonFileStore>,
    command: TaskCommand,
    json: bool,
) -> Result<(), AppError> {
    match command {
        TaskCommand::Add { title, date, color } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let date = match date {
                Some(value) => value,
                None => planner.today()?,
            };
            let color = match color {
                Some(value) => value.parse()?,
                None => TaskColor::default(),
            };

            let task = planner.add_task(&title, &date, color)?;
            if json {
                print_task_json(Some(&task));
            } else {
                println!("Added task: {} ({}) on {}", task.title, task.id, task.date);
            }
        }
        TaskCommand::List { date } => {
            let date = match date {
                Some(value) => value,
                None => planner.today()?,
            };
            let tasks = planner.tasks_on(&date)?;
            if json {
                println!("{}", serde_json::json!(tasks));
            } else {
                print_tasks_plain(date.trim(), &tasks);
            }
        }
        TaskCommand::Start { id } => {
            let task = planner.mark_started(&id)?;
            print_task_outcome(json, "Started", &id, task.as_ref());
        }
        TaskCommand::End { id } => {
            let task = planner.mark_ended(&id)?;
            print_task_outcome(json, "Ended", &id, task.as_ref());
        }
        TaskCommand::Time { id, start, end } => {
            let task = planner.set_times(&id, &start, &end)?;
            print_task_outcome(json, "Updated", &id, task.as_ref());
        }
        TaskCommand::Delete { id } => {
            let task = planner.delete_task(&id)?;
            print_task_outcome(json, "Deleted", &id, task.as_ref());
        }
    }

    Ok(())
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let mut planner = Planner::open(&config)?;
    let json = cli.json;

    match cli.command {
        Command::Sleep { sleep } => run_sleep(&mut planner, sleep, json)?,
        Command::Task { task } => run_task(&mut planner, task, json)?,
        Command::Calendar => {
            let markers = planner.markers();
            if json {
                println!("{}", serde_json::json!(markers));
            } else if markers.is_empty() {
                println!("No tasks scheduled");
            } else {
                for (date, marked) in &markers {
                    let dots: Vec<&str> =
                        marked.dots.iter().map(|dot| dot.color.as_str()).collect();
                    println!("{date}  {}", dots.join(" "));
                }
            }
        }
        Command::Recommend { date } => {
            let date = match date {
                Some(value) => value,
                None => planner.today()?,
            };
            let request = planner.recommendation_request(&date)?;
            let recommendation = request.recommend();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "base_date": request.base_date,
                        "today_tasks": request.today_tasks,
                        "tomorrow_tasks": request.tomorrow_tasks,
                        "recommendation": recommendation,
                        "message": recommendation.message(),
                    })
                );
            } else {
                println!("{}", recommendation.message());
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
