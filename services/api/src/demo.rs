use crate::infra::{parse_instant, InMemoryClientRepository, InMemoryNoticePublisher};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::sync::Arc;
use visa_desk::error::AppError;
use visa_desk::workflows::applications::{
    time_remaining, AdminId, ApplicationServiceError, ApplicationStatusEngine, ClientAggregates,
    ClientRegistration, TrackType, TrackView,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Instant the walkthrough starts at (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Skip the admin dashboard summary at the end.
    #[arg(long)]
    pub(crate) skip_dashboard: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CooldownArgs {
    /// When the track was rejected (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) rejected_at: DateTime<Utc>,
    /// Evaluation instant (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn run_cooldown(args: CooldownArgs) {
    let now = args.now.unwrap_or_else(Utc::now);
    let remaining = time_remaining(Some(args.rejected_at), now);
    if remaining.can_resubmit {
        println!("Cooldown elapsed: the client may resubmit.");
    } else {
        println!(
            "Resubmission locked for {}h {}m (rejected {}, evaluated {}).",
            remaining.hours_left, remaining.minutes_left, args.rejected_at, now
        );
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(Utc::now);
    let at = |hours: i64| start + Duration::hours(hours);

    let repository = Arc::new(InMemoryClientRepository::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let engine = ApplicationStatusEngine::new(repository, notices.clone());
    let admin = AdminId("admin-demo".to_string());

    println!("Client review walkthrough (starting {start})");
    let mut clients = Vec::new();
    for (name, email) in [
        ("Amina Diallo", "amina@example.com"),
        ("Lucas Moreau", "lucas@example.com"),
        ("Priya Raman", "priya@example.com"),
    ] {
        let client = engine.register_client(
            ClientRegistration {
                name: name.to_string(),
                email: email.to_string(),
            },
            start,
        )?;
        println!("- Registered {} ({})", client.name, client.id.0);
        clients.push(client);
    }
    let [amina, lucas, priya] = [&clients[0].id, &clients[1].id, &clients[2].id];

    println!("\nSubmissions");
    let before = engine.project_track_view(priya, TrackType::Equivalence, start)?;
    println!("  Priya equivalence before submitting: {}", describe(&before.view));
    engine.submit_track(amina, TrackType::Partner, start)?;
    engine.submit_track(lucas, TrackType::Residence, start)?;
    engine.submit_track(priya, TrackType::Equivalence, start)?;
    let after = engine.project_track_view(priya, TrackType::Equivalence, start)?;
    println!("  Priya equivalence after submitting: {}", describe(&after.view));

    println!("\nRejection and cooldown");
    engine.reject_track(
        priya,
        TrackType::Equivalence,
        "Missing documents".to_string(),
        at(0),
    )?;
    let countdown = engine.project_track_view(priya, TrackType::Equivalence, at(10))?;
    println!("  +10h view: {}", describe(&countdown.view));
    match engine.submit_track(priya, TrackType::Equivalence, at(10)) {
        Err(ApplicationServiceError::Transition(err)) => println!("  +10h resubmission: {err}"),
        Err(other) => return Err(other.into()),
        Ok(_) => println!("  +10h resubmission unexpectedly accepted"),
    }
    let reopened = engine.project_track_view(priya, TrackType::Equivalence, at(25))?;
    println!("  +25h view: {}", describe(&reopened.view));
    let resubmitted = engine.submit_track(priya, TrackType::Equivalence, at(25))?;
    println!("  +25h resubmission accepted -> {}", resubmitted.status);

    println!("\nValidation");
    engine.validate_track(lucas, TrackType::Residence, &admin, None, at(26))?;
    engine.validate_track(
        priya,
        TrackType::Equivalence,
        &admin,
        Some("diploma apostille checked".to_string()),
        at(27),
    )?;
    if let Err(err) = engine.validate_track(lucas, TrackType::Residence, &admin, None, at(28)) {
        println!("  Repeat validation refused: {err}");
    }

    if !args.skip_dashboard {
        let aggregates = engine.list_aggregates(at(28))?;
        render_dashboard(&aggregates);
    }

    let events = notices.events();
    if events.is_empty() {
        println!("\nReview notices: none dispatched");
    } else {
        println!("\nReview notices");
        for notice in events {
            println!(
                "  - template={} -> {} ({})",
                notice.template, notice.client_id.0, notice.track
            );
        }
    }

    Ok(())
}

fn describe(view: &TrackView) -> String {
    match view {
        TrackView::Form {
            show_resubmission_warning: false,
        } => "submission form".to_string(),
        TrackView::Form {
            show_resubmission_warning: true,
        } => "submission form (previously rejected)".to_string(),
        TrackView::PendingBanner => "pending review banner".to_string(),
        TrackView::ValidatedBanner => "validated banner".to_string(),
        TrackView::RejectedBanner {
            reason,
            hours_left,
            minutes_left,
        } => format!("rejected banner '{reason}', {hours_left}h {minutes_left}m left"),
    }
}

fn render_dashboard(aggregates: &ClientAggregates) {
    println!("\nAdmin dashboard");
    println!("  Total clients: {}", aggregates.counts.total_clients);
    for track in TrackType::ordered() {
        let tile = aggregates.counts.track(track);
        println!(
            "  {}: {} pending, {} validated, {} cooling down",
            track, tile.pending, tile.validated, tile.rejected_in_cooldown
        );
        for client in aggregates.pending(track) {
            println!("    - awaiting review: {} <{}>", client.name, client.email);
        }
    }

    println!("  Recently validated");
    for entry in &aggregates.validated_entries {
        println!(
            "    - {} {} at {}",
            entry.client_name, entry.track, entry.validated_at
        );
    }
}
