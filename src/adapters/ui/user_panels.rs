//! Policyholder dashboard panels.

use super::format;
use super::progress::with_spinner;
use super::tui::{Answer, PanelExit, answer, notice};
use crate::domain::{DomainError, HeldPolicy};
use crate::usecases::policyholder_service::{catalog_categories, catalog_in};
use crate::usecases::{Dashboard, MountTicket, PolicyholderService, UserPanel};
use inquire::{Confirm, CustomType, Select, Text};

const NO_POLICIES: &str = "You have no policies yet.";

pub fn details(dash: &Dashboard<UserPanel>) -> PanelExit {
    let profile = dash.profile();
    println!("  Name:     {}", profile.full_name());
    println!("  Username: {}", dash.username());
    if let Some(email) = &profile.email {
        println!("  Email:    {}", email);
    }
    if let Some(mobile) = &profile.mobile {
        println!("  Mobile:   {}", mobile);
    }
    if let Some(age) = profile.age {
        println!("  Age:      {}", age);
    }
    PanelExit::Done
}

/// Pick one of the caller's own policies. An empty list reads as Esc.
fn pick_policy<'a>(
    prompt: &str,
    policies: &'a [HeldPolicy],
) -> Result<Answer<&'a HeldPolicy>, DomainError> {
    if policies.is_empty() {
        println!("{}", NO_POLICIES);
        return Ok(Answer::Back);
    }
    let lines: Vec<String> = policies.iter().map(format::held_policy_line).collect();
    Ok(match answer(Select::new(prompt, lines).raw_prompt())? {
        Answer::Given(picked) => Answer::Given(&policies[picked.index]),
        Answer::Back => Answer::Back,
        Answer::Quit => Answer::Quit,
    })
}

/// Pick category, then policy, then premium plan from the catalog.
pub async fn add_policy(
    svc: &PolicyholderService,
    dash: &Dashboard<UserPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policies", svc.catalog()).await,
        "Failed to fetch all policies. Please try again."
    );
    let Some(catalog) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    let categories = catalog_categories(&catalog);
    if categories.is_empty() {
        println!("No policies are on offer right now.");
        return Ok(PanelExit::Done);
    }

    let category = ask!(Select::new("Category", categories).prompt());
    let offered = catalog_in(&catalog, &category);
    let names: Vec<String> = offered
        .iter()
        .map(|p| format!("{} (sum assured {})", p.name, format::money(p.sum_assured)))
        .collect();
    let policy = offered[ask!(Select::new("Policy", names).raw_prompt()).index];
    if policy.premium_plans.is_empty() {
        println!("{} has no premium plans.", policy.name);
        return Ok(PanelExit::Done);
    }
    let plans: Vec<String> = policy.premium_plans.iter().map(format::plan_line).collect();
    let plan = policy.premium_plans[ask!(Select::new("Premium plan", plans).raw_prompt()).index];

    let enrollment = attempt!(
        with_spinner("Adding policy", svc.add_policy(dash.username(), policy, plan)).await,
        "Failed to add policy. Please try again."
    );
    if dash.accept(ticket, ()).is_some() {
        notice(&format!(
            "Policy added successfully! Policy #{} {}",
            enrollment.policy_id, enrollment.policy_name
        ));
    }
    Ok(PanelExit::Done)
}

/// Move one held policy to another plan of the same catalog entry.
pub async fn update_policy(
    svc: &PolicyholderService,
    dash: &Dashboard<UserPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policies", svc.update_options(dash.username())).await,
        "Failed to fetch policies. Please try again."
    );
    let Some(options) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    let categories = options.categories();
    if categories.is_empty() {
        println!("{}", NO_POLICIES);
        return Ok(PanelExit::Done);
    }

    let category = ask!(Select::new("Category", categories).prompt());
    let held = options.policies_in(&category);
    let lines: Vec<String> = held.iter().map(|p| format::held_policy_line(p)).collect();
    let policy = held[ask!(Select::new("Policy", lines).raw_prompt()).index];
    let plans = options.plans_for(policy);
    if plans.is_empty() {
        println!("{} is no longer offered; there is no plan to switch to.", policy.policy_name);
        return Ok(PanelExit::Done);
    }
    let plan_lines: Vec<String> = plans.iter().map(format::plan_line).collect();
    let plan = plans[ask!(Select::new("New premium plan", plan_lines).raw_prompt()).index];

    let record = attempt!(
        with_spinner("Updating policy", svc.update_policy(dash.username(), policy, plan)).await,
        "Failed to update policy. Please try again."
    );
    if dash.accept(ticket, ()).is_some() {
        notice("Policy updated successfully!");
        if let Some(updated) = record.policies.iter().find(|p| p.policy_id == policy.policy_id) {
            println!("{}", format::held_policy_details(updated));
        }
    }
    Ok(PanelExit::Done)
}

pub async fn delete_policy(
    svc: &PolicyholderService,
    dash: &Dashboard<UserPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policies", svc.own_record(dash.username())).await,
        "Failed to fetch user policies. Please try again."
    );
    let Some(record) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    let policy = match pick_policy("Policy to delete", &record.policies)? {
        Answer::Given(policy) => policy,
        Answer::Back => return Ok(PanelExit::Done),
        Answer::Quit => return Ok(PanelExit::Quit),
    };
    let confirmed = ask!(
        Confirm::new(&format!("Delete policy #{}?", policy.policy_id))
            .with_default(false)
            .prompt()
    );
    if !confirmed {
        return Ok(PanelExit::Done);
    }

    let remaining = attempt!(
        with_spinner("Deleting policy", svc.delete_policy(dash.username(), &policy.policy_id)).await,
        "Failed to delete policy. Please try again."
    );
    if dash.accept(ticket, ()).is_some() {
        notice(&format!(
            "Policy #{} deleted. {} remaining.",
            policy.policy_id,
            remaining.policies.len()
        ));
    }
    Ok(PanelExit::Done)
}

pub async fn view_policy(
    svc: &PolicyholderService,
    dash: &Dashboard<UserPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policies", svc.own_record(dash.username())).await,
        "Failed to fetch user policies. Please try again."
    );
    let Some(record) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    if record.policies.is_empty() {
        println!("{}", NO_POLICIES);
    }
    for policy in &record.policies {
        println!("{}", format::held_policy_details(policy));
    }
    Ok(PanelExit::Done)
}

pub async fn apply_claim(
    svc: &PolicyholderService,
    dash: &Dashboard<UserPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policies", svc.own_record(dash.username())).await,
        "Failed to fetch user policies. Please try again."
    );
    let Some(record) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    let policy = match pick_policy("Claim against", &record.policies)? {
        Answer::Given(policy) => policy,
        Answer::Back => return Ok(PanelExit::Done),
        Answer::Quit => return Ok(PanelExit::Quit),
    };
    let help = format!("Remaining on this policy: {}", format::money(policy.left_amount));
    let amount = ask!(
        CustomType::<f64>::new("Claim amount:")
            .with_help_message(&help)
            .with_error_message("Please type a valid amount")
            .prompt()
    );
    let reason = ask!(Text::new("Reason:").prompt());

    let application = attempt!(
        with_spinner("Submitting claim", svc.apply_claim(dash.username(), policy, amount, &reason)).await,
        "Failed to submit claim. Please try again."
    );
    if dash.accept(ticket, ()).is_some() {
        notice(&format!(
            "Claim for {} on policy #{} submitted; it is pending review.",
            format::money(application.amount),
            application.policy_id
        ));
    }
    Ok(PanelExit::Done)
}
