//! Dashboard commands

use anyhow::{Context as _, Result};
use chrono::Utc;
use connecta_forms::application::dashboard::UserRow;
use connecta_forms::application::{AdminService, DashboardStats, UserFilter};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::OutputFormat;
use crate::DashboardCommands;

#[derive(Debug, Serialize, Tabled)]
struct UserLine {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Education")]
    education: String,
    #[tabled(rename = "Interest")]
    interest: String,
    #[tabled(rename = "Games")]
    games: String,
    #[tabled(rename = "Verified")]
    verified: String,
    #[tabled(rename = "Joined")]
    joined: String,
}

impl From<&UserRow> for UserLine {
    fn from(user: &UserRow) -> Self {
        Self {
            name: user.name.clone(),
            phone: user.phone_number.clone(),
            education: user.education_degree.clone(),
            interest: user.area_of_interest.clone(),
            games: user.favorite_games.join(", "),
            verified: if user.verified { "yes" } else { "no" }.into(),
            joined: user
                .created
                .map(|c| c.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct CountLine {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: String,
}

fn stat_lines(stats: &DashboardStats) -> Vec<CountLine> {
    let line = |group: &str, value: &str, count: String| CountLine {
        group: group.into(),
        value: value.into(),
        count,
    };
    let mut lines = vec![
        line("Users", "total", stats.total_users.to_string()),
        line(
            "Users",
            "verified",
            format!("{} ({:.1}%)", stats.verified_users, stats.verified_percent),
        ),
        line("Users", "new this week", stats.new_this_week.to_string()),
        line("Users", "top interest", stats.top_interest.clone()),
    ];
    let groups = [
        ("Education", &stats.education),
        ("Interest", &stats.interests),
        ("Top games", &stats.top_games),
        ("Monthly growth", &stats.monthly_growth),
    ];
    for (group, counts) in groups {
        lines.extend(counts.iter().map(|(value, n)| line(group, value, n.to_string())));
    }
    lines
}

pub async fn handle(context: &Context, email: &str, password: &str, action: DashboardCommands) -> Result<()> {
    let admin = AdminService::new(context.store()?);
    admin.login(email, password).await?;
    let page = admin.recent_users().await.context("Failed to load users")?;

    match action {
        DashboardCommands::Stats => {
            let stats = DashboardStats::compute(&page, Utc::now());
            match context.format {
                OutputFormat::Table => context.format.print_rows(&stat_lines(&stats)),
                format => format.print(&stats),
            }
        }
        DashboardCommands::Users {
            search,
            interest,
            education,
            game,
            status,
            sort,
            desc,
        } => {
            let filter = UserFilter {
                search,
                interest,
                education,
                game,
                status: status.into(),
                sort: sort.into(),
                descending: desc,
            };
            let users: Vec<UserRow> = page.items.iter().map(UserRow::from).collect();
            let rows = filter.apply(&users);
            match context.format {
                OutputFormat::Table => {
                    let lines: Vec<UserLine> = rows.iter().map(UserLine::from).collect();
                    context.format.print_rows(&lines);
                    println!("{} of {} users", rows.len(), page.total_items);
                }
                format => format.print(&rows),
            }
        }
    }
    Ok(())
}
