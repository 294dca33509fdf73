//! Admin dashboard panels.

use super::format;
use super::progress::with_spinner;
use super::tui::{PanelExit, notice, show_error};
use crate::domain::{ClaimStatus, DomainError, VerificationStatus};
use crate::usecases::{AdminPanel, AdminService, Dashboard, MountTicket, UserAction};
use inquire::{Confirm, Select};

fn action_label(action: UserAction, status: VerificationStatus) -> &'static str {
    match (action, status) {
        (UserAction::Approve, VerificationStatus::Rejected) => "Accept",
        (UserAction::Approve, _) => "Approve",
        (UserAction::Reject, _) => "Reject",
        (UserAction::View, _) => "View",
        (UserAction::Delete, _) => "Delete",
    }
}

pub fn details(dash: &Dashboard<AdminPanel>) -> PanelExit {
    let profile = dash.profile();
    println!("  Name:     {}", profile.full_name());
    println!("  Username: {}", dash.username());
    if let Some(email) = &profile.email {
        println!("  Email:    {}", email);
    }
    PanelExit::Done
}

/// Verification queue. Stays open until Esc so several users can be handled
/// in a row.
pub async fn confirm_user(
    svc: &AdminService,
    dash: &Dashboard<AdminPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching users", svc.verification_queue()).await,
        "Failed to fetch users"
    );
    let Some(mut users) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };

    loop {
        if users.is_empty() {
            println!("No users awaiting verification.");
            return Ok(PanelExit::Done);
        }
        let lines: Vec<String> = users.iter().map(format::pending_user_line).collect();
        let picked = ask!(
            Select::new("Users", lines)
                .with_help_message("Esc to go back")
                .raw_prompt()
        );
        let user = users[picked.index].clone();
        let actions = UserAction::available(user.status);
        if actions.is_empty() {
            show_error(&format!("No actions for status '{}'", user.status));
            continue;
        }
        let labels: Vec<&str> = actions
            .iter()
            .map(|a| action_label(*a, user.status))
            .collect();
        let prompt = format!("{} ({})", user.username, user.status);
        let chosen = ask!(Select::new(&prompt, labels).raw_prompt());

        let refreshed = match actions[chosen.index] {
            UserAction::Approve => attempt!(
                with_spinner("Approving", svc.approve_user(&user.username)).await,
                "Failed to confirm user"
            ),
            UserAction::Reject => attempt!(
                with_spinner("Rejecting", svc.reject_user(&user.username)).await,
                "Failed to reject user"
            ),
            UserAction::Delete => {
                let confirmed = ask!(
                    Confirm::new(&format!("Delete {} permanently?", user.username))
                        .with_default(false)
                        .prompt()
                );
                if !confirmed {
                    continue;
                }
                attempt!(
                    with_spinner("Deleting", svc.delete_user(&user.username)).await,
                    "Failed to delete user"
                )
            }
            UserAction::View => {
                let holder = attempt!(
                    with_spinner("Fetching policyholder", svc.view_user(&user.username)).await,
                    "Failed to fetch user details. Please try again."
                );
                if dash.accept(ticket, ()).is_some() {
                    println!("{}", format::policyholder_line(&holder));
                    for policy in &holder.policies {
                        println!("{}", format::held_policy_details(policy));
                    }
                }
                continue;
            }
        };
        match dash.accept(ticket, refreshed) {
            Some(fresh) => {
                notice(&format!("{} updated.", user.username));
                users = fresh;
            }
            None => return Ok(PanelExit::Done),
        }
    }
}

/// Claims of verified policyholders with per-holder and overall metrics.
pub async fn approve_claim(
    svc: &AdminService,
    dash: &Dashboard<AdminPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policyholders and claims", svc.claims_overview()).await,
        "Failed to fetch data"
    );
    let Some(mut overview) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };

    loop {
        println!("Total claims: {}", format::metrics_line(&overview.totals));
        if overview.holders.is_empty() {
            println!("No verified policyholders.");
            return Ok(PanelExit::Done);
        }
        let lines: Vec<String> = overview
            .holders
            .iter()
            .map(|h| {
                format!(
                    "{:<16} {} | {}",
                    h.holder.username,
                    h.holder.first_name,
                    format::metrics_line(&h.metrics)
                )
            })
            .collect();
        let picked = ask!(
            Select::new("Verified policyholders", lines)
                .with_help_message("Esc to go back")
                .raw_prompt()
        );
        let entry = &overview.holders[picked.index];
        if entry.claims.is_empty() {
            println!("{} has filed no claims.", entry.holder.username);
            continue;
        }
        for claim in &entry.claims {
            println!("  {}", format::claim_line(claim));
        }
        let pending: Vec<String> = entry
            .claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Pending)
            .map(format::claim_line)
            .collect();
        let pending_ids: Vec<String> = entry
            .claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Pending)
            .map(|c| c.id.clone())
            .collect();
        if pending.is_empty() {
            println!("No pending claims.");
            continue;
        }
        let claim = ask!(Select::new("Pending claims", pending).raw_prompt());
        let claim_id = &pending_ids[claim.index];
        let decision = ask!(Select::new("Decision", vec!["Confirm", "Reject"]).prompt());

        let confirm = decision == "Confirm";
        let refreshed = if confirm {
            attempt!(
                with_spinner("Confirming claim", svc.confirm_claim(claim_id)).await,
                "Failed to confirm claim"
            )
        } else {
            attempt!(
                with_spinner("Rejecting claim", svc.reject_claim(claim_id)).await,
                "An error occurred during Rejecting claim"
            )
        };
        match dash.accept(ticket, refreshed) {
            Some(fresh) => {
                let verb = if confirm { "approved" } else { "rejected" };
                notice(&format!("Claim {} {}.", claim_id, verb));
                overview = fresh;
            }
            None => return Ok(PanelExit::Done),
        }
    }
}

/// Every policyholder regardless of verification status.
pub async fn policyholders(
    svc: &AdminService,
    dash: &Dashboard<AdminPanel>,
    ticket: MountTicket,
) -> Result<PanelExit, DomainError> {
    let fetched = attempt!(
        with_spinner("Fetching policyholders", svc.policyholders()).await,
        "Failed to fetch users"
    );
    let Some(holders) = dash.accept(ticket, fetched) else {
        return Ok(PanelExit::Done);
    };
    if holders.is_empty() {
        println!("No policyholders yet.");
        return Ok(PanelExit::Done);
    }
    let lines: Vec<String> = holders.iter().map(format::policyholder_line).collect();
    loop {
        let picked = ask!(
            Select::new("Policyholders", lines.clone())
                .with_help_message("Enter to view policies, Esc to go back")
                .raw_prompt()
        );
        let holder = &holders[picked.index];
        if holder.policies.is_empty() {
            println!("{} holds no policies.", holder.username);
        }
        for policy in &holder.policies {
            println!("{}", format::held_policy_details(policy));
        }
    }
}
