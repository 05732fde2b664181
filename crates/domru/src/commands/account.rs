//! Operator, place, profile and finance handlers.

use tabled::Tabled;

use domru_api::{Operator, SessionClient, SubscriberFinances, SubscriberPlace, SubscriberProfile};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, or_dash, yes_no};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct OperatorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Operator> for OperatorRow {
    fn from(o: &Operator) -> Self {
        Self {
            id: o.id,
            name: o.disp_name.clone(),
        }
    }
}

#[derive(Tabled)]
struct PlaceRow {
    #[tabled(rename = "Place")]
    id: u64,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Doors")]
    doors: usize,
    #[tabled(rename = "Blocked")]
    blocked: String,
}

impl From<&SubscriberPlace> for PlaceRow {
    fn from(p: &SubscriberPlace) -> Self {
        Self {
            id: p.place.id,
            address: or_dash(p.place.visible_address()),
            role: or_dash(p.subscriber_type.as_deref()),
            doors: p.place.access_controls.len(),
            blocked: yes_no(p.blocked),
        }
    }
}

fn profile_detail(p: &SubscriberProfile) -> String {
    let mut lines = vec![
        format!("Subscriber: {}", p.subscriber.id),
        format!("Name:       {}", or_dash(p.subscriber.name.as_deref())),
        format!("Account:    {}", or_dash(p.subscriber.account_id.as_deref())),
    ];
    for phone in &p.subscriber_phones {
        lines.push(format!("Phone:      {}", phone.number));
    }
    lines.join("\n")
}

fn finances_detail(f: &SubscriberFinances) -> String {
    let mut lines = vec![format!(
        "Balance:    {}",
        f.balance.map_or_else(|| "-".into(), |b| format!("{b:.2}"))
    )];
    if let Some(amount) = f.amount_sum {
        lines.push(format!("To pay:     {amount:.2}"));
    }
    if let Some(ref date) = f.target_date {
        lines.push(format!("Due:        {date}"));
    }
    lines.push(format!("Blocked:    {}", yes_no(f.blocked)));
    if let Some(ref kind) = f.block_type {
        lines.push(format!("Block type: {kind}"));
    }
    if let Some(ref link) = f.payment_link {
        lines.push(format!("Pay at:     {link}"));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn operators(session: &SessionClient, global: &GlobalOpts) -> Result<(), CliError> {
    let operators = session.get_operators().await?;
    let out = output::render_list(
        &global.output,
        &operators,
        |o| OperatorRow::from(o),
        |o| o.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn places(session: &SessionClient, global: &GlobalOpts) -> Result<(), CliError> {
    let places = session.get_subscriber_places().await?;
    let out = output::render_list(
        &global.output,
        &places,
        |p| PlaceRow::from(p),
        |p| p.place.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn profile(session: &SessionClient, global: &GlobalOpts) -> Result<(), CliError> {
    let profile = session.get_profile().await?;
    let out = output::render_single(&global.output, &profile, profile_detail, |p| {
        p.subscriber.id.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn finances(session: &SessionClient, global: &GlobalOpts) -> Result<(), CliError> {
    let finances = session.get_finances().await?;
    let out = output::render_single(&global.output, &finances, finances_detail, |f| {
        f.balance.map(|b| format!("{b:.2}")).unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
