//! NutriFlex CLI
//!
//! Command-line client for a running NutriFlex API server:
//! - Log meals, exercise, water, sleep, steps and habits
//! - Show today's score, streaks and weekly series
//! - Export/import full backups
//! - Check status, generate a config file

use anyhow::{bail, Context};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use nutriflex::tracker::{
    DailyBreakdown, Habit, HistoryItem, Streaks, WeeklyStatsData, WellnessDay,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutriflex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gamified daily wellness tracker")]
#[command(long_about = "NutriFlex scores your meals, exercise and hydration every day.\nLog activity, keep your streaks alive and review the week.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://127.0.0.1:8086", global = true)]
    pub api_url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a meal
    Meal {
        /// What was eaten
        title: String,
        /// Mark the meal as a treat
        #[arg(long)]
        unhealthy: bool,
        /// Estimated calories
        #[arg(short, long, default_value = "0")]
        calories: u32,
        /// Plan the meal instead of logging it as eaten
        #[arg(long)]
        pending: bool,
        /// Free-text notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Explicit XP delta
        #[arg(long, allow_hyphen_values = true)]
        score: Option<i32>,
    },

    /// Mark a planned meal as eaten
    Confirm {
        /// Meal id
        id: String,
        /// Free-text notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Log exercise
    Exercise {
        /// Activity name
        name: String,
        /// Minutes
        #[arg(short, long)]
        duration: u32,
        /// Baja, Media, Alta, Extrema (or low, medium, high, extreme)
        #[arg(short, long, default_value = "Media")]
        intensity: String,
        /// Wall-clock time "HH:MM" (default: now)
        #[arg(short, long)]
        time: Option<String>,
        /// Calories burned
        #[arg(short, long, default_value = "0")]
        calories: u32,
    },

    /// Add (or remove, with a negative number) cups of water
    Water {
        #[arg(allow_hyphen_values = true, default_value = "1")]
        delta: i64,
    },

    /// Set today's hours of sleep
    Sleep { hours: f64 },

    /// Set today's step count
    Steps { count: u32 },

    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Today's score breakdown
    Score,

    /// Consecutive-day streaks
    Streaks,

    /// Last 7 days of nutrition, exercise and water
    Weekly,

    /// Last 7 days of sleep, steps and habits
    Wellness,

    /// Unified meal/exercise history
    History {
        /// Show at most this many items
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Plain-text digest of recent activity
    Context {
        #[arg(long, default_value = "48")]
        hours: u32,
    },

    /// Delete a history item
    Delete { id: String },

    /// Export or import a full backup
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add { title: String },
    /// List habits and today's completion
    List,
    /// Flip today's completion
    Toggle { id: String },
    /// Delete a habit (its history is kept)
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// Write the full-state bundle to a file
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a bundle; nothing is written if it is invalid
    Import { path: PathBuf },
}

struct ApiClient {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("no details")
                .to_string();
            bail!("Request failed ({}): {}", status, message);
        }
        Ok(response.json().await?)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = ApiClient::new(&cli.api_url);
    let format = cli.format;

    match cli.command {
        Commands::Meal {
            title,
            unhealthy,
            calories,
            pending,
            notes,
            score,
        } => {
            let body = serde_json::json!({
                "title": title,
                "status": if pending { "pending" } else { "completed" },
                "isHealthy": !unhealthy,
                "calories": calories,
                "notes": notes,
                "scoreValue": score,
            });
            let items: Vec<HistoryItem> = api.post("/api/v1/meals", &body).await?;
            if let Some(item) = items.first() {
                println!("Logged meal {} ({})", title, item.id());
            }
        }

        Commands::Confirm { id, notes } => {
            let body = serde_json::json!({ "notes": notes });
            let _: Vec<HistoryItem> = api
                .post(&format!("/api/v1/meals/{}/confirm", id), &body)
                .await?;
            println!("Confirmed meal {}", id);
        }

        Commands::Exercise {
            name,
            duration,
            intensity,
            time,
            calories,
        } => {
            let body = serde_json::json!({
                "name": name,
                "duration": duration,
                "intensity": intensity,
                "time": time,
                "caloriesBurned": calories,
            });
            let _: Vec<HistoryItem> = api.post("/api/v1/exercises", &body).await?;
            println!("Logged {} ({} min)", name, duration);
        }

        Commands::Water { delta } => {
            let water: serde_json::Value = api
                .post("/api/v1/water", &serde_json::json!({ "delta": delta }))
                .await?;
            println!("Water today: {} cups", water["count"].as_u64().unwrap_or(0));
        }

        Commands::Sleep { hours } => {
            let sleep: serde_json::Value = api
                .post("/api/v1/sleep", &serde_json::json!({ "hours": hours }))
                .await?;
            println!(
                "Sleep for {}: {}h",
                sleep["date"].as_str().unwrap_or("today"),
                sleep["hours"].as_f64().unwrap_or(hours)
            );
        }

        Commands::Steps { count } => {
            let steps: serde_json::Value = api
                .post("/api/v1/steps", &serde_json::json!({ "count": count }))
                .await?;
            println!(
                "Steps for {}: {}",
                steps["date"].as_str().unwrap_or("today"),
                steps["steps"].as_u64().unwrap_or(u64::from(count))
            );
        }

        Commands::Habit { action } => run_habit(&api, action, format).await?,

        Commands::Score => {
            let breakdown: DailyBreakdown = api.get("/api/v1/stats/daily").await?;
            if format == OutputFormat::Json {
                print_json(&breakdown)?;
            } else {
                print_breakdown(&breakdown);
            }
        }

        Commands::Streaks => {
            let streaks: Streaks = api.get("/api/v1/stats/streaks").await?;
            match format {
                OutputFormat::Json => print_json(&streaks)?,
                OutputFormat::Csv => write_csv(&[streaks])?,
                OutputFormat::Table => {
                    println!("{:<12} {}", "Pillar", "Days");
                    println!("{}", "-".repeat(18));
                    println!("{:<12} {}", "Nutrition", streaks.nutrition);
                    println!("{:<12} {}", "Exercise", streaks.exercise);
                    println!("{:<12} {}", "Hydration", streaks.hydration);
                    println!("{:<12} {}", "Habits", streaks.habits);
                }
            }
        }

        Commands::Weekly => {
            let week: Vec<WeeklyStatsData> = api.get("/api/v1/stats/weekly").await?;
            match format {
                OutputFormat::Json => print_json(&week)?,
                OutputFormat::Csv => write_csv(&week)?,
                OutputFormat::Table => {
                    println!(
                        "{:<5} {:<12} | {:>6} | {:>8} | {:>5}",
                        "Day", "Date", "XP", "Minutes", "Cups"
                    );
                    println!("{}", "-".repeat(46));
                    for day in &week {
                        println!(
                            "{:<5} {:<12} | {:>6} | {:>8} | {:>5}",
                            day.day,
                            day.date.to_string(),
                            day.nutrition_xp,
                            day.exercise_mins,
                            day.water_cups
                        );
                    }
                }
            }
        }

        Commands::Wellness => {
            let week: Vec<WellnessDay> = api.get("/api/v1/stats/wellness").await?;
            match format {
                OutputFormat::Json => print_json(&week)?,
                OutputFormat::Csv => write_csv(&week)?,
                OutputFormat::Table => {
                    println!(
                        "{:<5} {:<12} | {:>6} | {:>7} | {:>6}",
                        "Day", "Date", "Sleep", "Steps", "Habits"
                    );
                    println!("{}", "-".repeat(46));
                    for day in &week {
                        println!(
                            "{:<5} {:<12} | {:>6.1} | {:>7} | {:>6}",
                            day.day_name,
                            day.date.to_string(),
                            day.sleep,
                            day.steps,
                            day.completed_habits
                        );
                    }
                }
            }
        }

        Commands::History { limit } => {
            let items: Vec<HistoryItem> = api.get("/api/v1/history").await?;
            let items: Vec<HistoryItem> = items.into_iter().take(limit).collect();
            match format {
                OutputFormat::Json => print_json(&items)?,
                OutputFormat::Csv => write_csv(&history_rows(&items))?,
                OutputFormat::Table => print_history(&items),
            }
        }

        Commands::Context { hours } => {
            let context: serde_json::Value =
                api.get(&format!("/api/v1/context?hours={}", hours)).await?;
            println!("{}", context["summary"].as_str().unwrap_or_default());
        }

        Commands::Delete { id } => {
            let _: Vec<HistoryItem> = api.delete(&format!("/api/v1/history/{}", id)).await?;
            println!("Deleted {}", id);
        }

        Commands::Backup { action } => run_backup(&api, action).await?,

        Commands::Status => run_status(&api).await?,

        Commands::Config { output } => {
            let config = nutriflex::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn run_habit(api: &ApiClient, action: HabitAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        HabitAction::Add { title } => {
            let habits: Vec<Habit> = api
                .post("/api/v1/habits", &serde_json::json!({ "title": title }))
                .await?;
            if let Some(habit) = habits.iter().rev().find(|h| h.title == title) {
                println!("Created habit {} ({})", habit.title, habit.id);
            }
        }
        HabitAction::List => {
            let habits: Vec<Habit> = api.get("/api/v1/habits").await?;
            let today: serde_json::Value = api.get("/api/v1/habits/today").await?;
            let done: Vec<&str> = today["habitIds"]
                .as_array()
                .map(|ids| ids.iter().filter_map(|id| id.as_str()).collect())
                .unwrap_or_default();

            match format {
                OutputFormat::Json => print_json(&habits)?,
                OutputFormat::Csv => write_csv(&habits)?,
                OutputFormat::Table if habits.is_empty() => {
                    println!("No habits defined yet.");
                    println!();
                    println!("Create your first habit with:");
                    println!("  nutriflex habit add \"Read 10 pages\"");
                }
                OutputFormat::Table => {
                    println!("{:<6} {:<30} {}", "Done", "Title", "ID");
                    println!("{}", "-".repeat(74));
                    for habit in &habits {
                        let mark = if done.contains(&habit.id.as_str()) { "[x]" } else { "[ ]" };
                        println!("{:<6} {:<30} {}", mark, habit.title, habit.id);
                    }
                }
            }
        }
        HabitAction::Toggle { id } => {
            let result: serde_json::Value = api
                .post(&format!("/api/v1/habits/{}/toggle", id), &serde_json::json!({}))
                .await?;
            let state = if result["completed"].as_bool().unwrap_or(false) {
                "done"
            } else {
                "not done"
            };
            println!("Habit {} marked {} for today", id, state);
        }
        HabitAction::Delete { id } => {
            let _: Vec<Habit> = api.delete(&format!("/api/v1/habits/{}", id)).await?;
            println!("Deleted habit {}", id);
        }
    }
    Ok(())
}

async fn run_backup(api: &ApiClient, action: BackupAction) -> anyhow::Result<()> {
    match action {
        BackupAction::Export { output } => {
            let bundle: serde_json::Value = api.get("/api/v1/backup").await?;
            let data = serde_json::to_string_pretty(&bundle)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Backup written to {:?}", path);
                }
                None => println!("{}", data),
            }
        }
        BackupAction::Import { path } => {
            if !path.exists() {
                bail!("File not found: {:?}", path);
            }
            let payload = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;

            let response = api
                .client
                .post(api.url("/api/v1/backup"))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload)
                .send()
                .await?;
            let result: serde_json::Value = ApiClient::decode(response).await?;
            println!(
                "Backup restored ({} collections)",
                result["keys"].as_u64().unwrap_or(0)
            );
        }
    }
    Ok(())
}

async fn run_status(api: &ApiClient) -> anyhow::Result<()> {
    let response = api.client.get(api.url("/health")).send().await;

    match response {
        Ok(resp) if resp.status().is_success() => {
            let health: serde_json::Value = resp.json().await?;

            println!("NutriFlex v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!(
                "API Status: {}",
                health["status"].as_str().unwrap_or("unknown")
            );
            println!("Storage: {}", health["storage"].as_str().unwrap_or("unknown"));

            if let Some(recovered) = health["recovered"].as_array().filter(|r| !r.is_empty()) {
                println!();
                println!("Reset after corruption:");
                for key in recovered {
                    println!("  {}", key.as_str().unwrap_or("-"));
                }
            }

            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!();
                println!("Uptime: {}", format_duration(uptime));
            }
            Ok(())
        }
        Ok(resp) => bail!("API returned error: {}", resp.status()),
        Err(e) => {
            eprintln!("Cannot connect to NutriFlex API at {}", api.base);
            eprintln!();
            eprintln!("Make sure the NutriFlex API server is running:");
            eprintln!("  cargo run --bin nutriflex-api");
            Err(e.into())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_csv<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_breakdown(breakdown: &DailyBreakdown) {
    println!("{:<12} {:>6} / {:<6} {}", "Pillar", "XP", "Goal", "Progress");
    println!("{}", "-".repeat(44));
    for metric in [&breakdown.nutrition, &breakdown.exercise, &breakdown.hydration] {
        println!(
            "{:<12} {:>6} / {:<6} {}",
            metric.label,
            metric.current,
            metric.max,
            progress_bar(metric.percent)
        );
    }
    println!("{}", "-".repeat(44));
    println!("{:<12} {:>6}", "Total", breakdown.total_xp);
}

fn progress_bar(percent: f64) -> String {
    let filled = (percent.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("[{}{}] {:>3.0}%", "#".repeat(filled), ".".repeat(10 - filled), percent * 100.0)
}

#[derive(Serialize)]
struct HistoryRow {
    kind: &'static str,
    id: String,
    recorded: String,
    title: String,
    detail: String,
}

fn history_rows(items: &[HistoryItem]) -> Vec<HistoryRow> {
    items
        .iter()
        .map(|item| {
            let recorded = DateTime::from_timestamp_millis(item.timestamp())
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_else(|| "-".to_string());

            match item {
                HistoryItem::Meal(meal) => HistoryRow {
                    kind: "meal",
                    id: meal.id.clone(),
                    recorded,
                    title: meal.title.clone(),
                    detail: format!(
                        "{:?} {} {}kcal",
                        meal.status,
                        if meal.is_healthy { "healthy" } else { "treat" },
                        meal.calories
                    )
                    .to_lowercase(),
                },
                HistoryItem::Exercise(exercise) => HistoryRow {
                    kind: "exercise",
                    id: exercise.id.clone(),
                    recorded,
                    title: exercise.name.clone(),
                    detail: format!(
                        "{}min {} at {}",
                        exercise.duration, exercise.intensity, exercise.time
                    ),
                },
            }
        })
        .collect()
}

fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("No activity logged yet.");
        return;
    }

    println!("{:<9} {:<21} {:<28} {}", "Type", "Recorded", "Title", "Detail");
    println!("{}", "-".repeat(90));
    for row in history_rows(items) {
        println!(
            "{:<9} {:<21} {:<28} {}",
            row.kind, row.recorded, row.title, row.detail
        );
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
