use chrono::NaiveDate;
use clap::{Args, Subcommand};
use studyflow_core::scheduler::{analysis, SchedulerConfig, StudyPlan, StudyScheduler};
use studyflow_core::storage::{AccountStore, CalendarStore, Config, EventCategory, NewEvent};
use studyflow_core::Assignment;
use uuid::Uuid;

use super::require_session;

#[derive(Args)]
pub struct AssignmentArgs {
    /// Assignment title
    pub title: String,
    /// Course name
    #[arg(long)]
    pub course: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: NaiveDate,
    /// Your own effort estimate in hours
    #[arg(long)]
    pub hours: f64,
    /// Difficulty 1-5
    #[arg(long, default_value_t = 3)]
    pub difficulty: u8,
    /// Percentage of the course grade
    #[arg(long, default_value_t = 15.0)]
    pub importance: f64,
    /// Current grade percentage
    #[arg(long)]
    pub current_grade: Option<f64>,
    /// Target grade percentage
    #[arg(long)]
    pub target_grade: Option<f64>,
}

impl AssignmentArgs {
    fn into_assignment(self) -> Assignment {
        Assignment {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            course: self.course,
            due_date: self.due,
            estimated_hours: self.hours,
            difficulty: self.difficulty,
            importance: self.importance,
            current_grade: self.current_grade,
            target_grade: self.target_grade,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Generate a study plan for an assignment
    Generate {
        #[command(flatten)]
        assignment: AssignmentArgs,
        /// Persist the plan to the calendar as study events
        #[arg(long)]
        save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print study tips for an assignment without planning it
    Tips {
        #[command(flatten)]
        assignment: AssignmentArgs,
    },
}

fn print_plan(plan: &StudyPlan, max_daily_hours: f64, show_tips: bool, assignment: &Assignment) {
    println!(
        "{} sessions, {}h total, due in {} days",
        plan.total_sessions, plan.total_hours, plan.days_until_due
    );
    for item in &plan.items {
        println!(
            "  {}  {:<8} {:.1}h  {}  ({})",
            item.date_string,
            format!("{:?}", item.priority).to_lowercase(),
            item.length,
            item.title,
            item.optimal_time
        );
    }

    let warnings = analysis::balance_adjustments(&plan.items, max_daily_hours);
    for warning in &warnings {
        println!("  ! {}", warning.suggestion);
    }

    if show_tips {
        println!("tips:");
        for tip in analysis::study_tips(assignment) {
            println!("  - {tip}");
        }
    }
}

fn save_plan(plan: &StudyPlan, username: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let store = CalendarStore::open()?;
    for item in &plan.items {
        let mut times = item.optimal_time.split(" - ");
        store.add_event(&NewEvent {
            username: username.to_string(),
            date: item.date,
            title: item.title.clone(),
            category: EventCategory::Study,
            description: Some(item.description.clone()),
            start_time: times.next().map(str::to_string),
            end_time: times.next().map(str::to_string),
        })?;
    }
    Ok(plan.items.len())
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        PlanAction::Generate {
            assignment,
            save,
            json,
        } => {
            let assignment = assignment.into_assignment();
            let today = chrono::Local::now().date_naive();
            let scheduler = StudyScheduler::with_config(SchedulerConfig {
                max_daily_hours: config.scheduler.max_daily_hours,
            });
            let plan = scheduler.generate_plan(&assignment, today)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(
                    &plan,
                    config.scheduler.max_daily_hours,
                    config.display.show_tips,
                    &assignment,
                );
            }

            if save {
                let accounts = AccountStore::open()?;
                let user = require_session(&accounts)?;
                let saved = save_plan(&plan, &user.username)?;
                println!("saved {saved} study events");
            }
        }
        PlanAction::Tips { assignment } => {
            let assignment = assignment.into_assignment();
            for tip in analysis::study_tips(&assignment) {
                println!("- {tip}");
            }
        }
    }
    Ok(())
}
