//! Implements InputPort. Inquire-based interactive prompts.
//!
//! The loop asks the authorization gate what a path renders, shows that
//! screen, and follows whatever path the screen hands back. Dashboards
//! mount through `Dashboard::mount` and hand each sidebar selection to a
//! panel function in `admin_panels` / `user_panels`.

use super::progress::with_spinner;
use super::{admin_panels, user_panels};
use crate::domain::routes::{self, Screen};
use crate::domain::{AdminSection, AuthorizationState, Credentials, DomainError, RegistrationForm};
use crate::ports::{ClaimsApi, InputPort, SessionStorePort};
use crate::usecases::{
    AdminPanel, AdminService, AuthService, AuthorizationGate, Dashboard, Navigation, Panel,
    PolicyholderService, UserPanel,
};
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetForegroundColor};
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::io::stdout;
use std::sync::Arc;
use tracing::debug;

/// Applies the prompt theme globally. Called once from `init_ui`.
pub fn apply_theme() {
    let mut config = RenderConfig::default();
    config.prompt_prefix = Styled::new("?").with_fg(Color::LightCyan);
    config.highlighted_option_prefix = Styled::new(">").with_fg(Color::LightYellow);
    config.selected_option = Some(StyleSheet::new().with_fg(Color::LightYellow));
    config.answer = StyleSheet::new().with_fg(Color::LightCyan);
    inquire::set_global_render_config(config);
}

/// A prompt outcome with Esc and Ctrl-C told apart from real failures.
pub enum Answer<T> {
    Given(T),
    Back,
    Quit,
}

pub fn answer<T>(result: Result<T, InquireError>) -> Result<Answer<T>, DomainError> {
    match result {
        Ok(value) => Ok(Answer::Given(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Back),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Quit),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// How a panel handed control back to its dashboard.
#[derive(Debug)]
pub enum PanelExit {
    Done,
    Quit,
    ForceLogout(DomainError),
}

/// Panel-level error policy: a dead session ends the dashboard, anything
/// else is shown inline and the sidebar comes back.
pub fn report(err: DomainError, fallback: &str) -> PanelExit {
    if err.forces_logout() {
        PanelExit::ForceLogout(err)
    } else {
        debug!(error = %err, "panel request failed");
        show_error(&err.user_message(fallback));
        PanelExit::Done
    }
}

fn paint(color: TermColor, text: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(color));
    let _ = out.execute(Print(text));
    let _ = out.execute(Print("\r\n"));
    let _ = out.execute(ResetColor);
}

pub fn show_error(message: &str) {
    paint(TermColor::Red, &format!("x {}", message));
}

pub fn notice(message: &str) {
    paint(TermColor::Green, message);
}

pub fn heading(title: &str) {
    paint(TermColor::Cyan, &format!("\n== {} ==", title));
}

/// Where the gate loop goes after a screen.
enum Flow {
    Goto(String),
    Quit,
}

fn to_login() -> Flow {
    Flow::Goto(routes::LOGIN.to_string())
}

enum SidebarChoice<P> {
    Panel(P),
    Logout,
    Quit,
}

const LOGOUT: &str = "Logout";
const QUIT: &str = "Quit";

/// Sidebar of a dashboard. Esc just asks again.
fn sidebar<P: Panel>(title: &str) -> Result<SidebarChoice<P>, DomainError> {
    let mut options: Vec<&str> = P::ALL.iter().map(|p| p.label()).collect();
    options.push(LOGOUT);
    options.push(QUIT);
    loop {
        let choice = Select::new(title, options.clone())
            .with_page_size(options.len())
            .raw_prompt();
        match answer(choice)? {
            Answer::Given(option) => {
                return Ok(match P::ALL.get(option.index) {
                    Some(panel) => SidebarChoice::Panel(*panel),
                    None if option.value == LOGOUT => SidebarChoice::Logout,
                    None => SidebarChoice::Quit,
                });
            }
            Answer::Back => continue,
            Answer::Quit => return Ok(SidebarChoice::Quit),
        }
    }
}

/// Closes the panel and turns its exit into the dashboard's next move.
fn settle<P: Panel>(
    gate: &mut AuthorizationGate,
    dash: &mut Dashboard<P>,
    exit: PanelExit,
) -> Result<Option<Flow>, DomainError> {
    dash.deselect();
    match exit {
        PanelExit::Done => Ok(None),
        PanelExit::Quit => Ok(Some(Flow::Quit)),
        PanelExit::ForceLogout(err) => {
            show_error(&err.user_message("Please login again."));
            gate.force_logout(&err)?;
            Ok(Some(to_login()))
        }
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    store: Arc<dyn SessionStorePort>,
    api: Arc<dyn ClaimsApi>,
    auth: Arc<AuthService>,
    admin: Arc<AdminService>,
    policyholders: Arc<PolicyholderService>,
}

impl TuiInputPort {
    pub fn new(
        store: Arc<dyn SessionStorePort>,
        api: Arc<dyn ClaimsApi>,
        auth: Arc<AuthService>,
        admin: Arc<AdminService>,
        policyholders: Arc<PolicyholderService>,
    ) -> Self {
        Self {
            store,
            api,
            auth,
            admin,
            policyholders,
        }
    }

    async fn login_screen(&self, gate: &mut AuthorizationGate) -> Result<Flow, DomainError> {
        heading("Login");
        const SIGN_IN: &str = "Sign in";
        const REGISTER: &str = "Create an account";
        let choice = ask!(
            Select::new("Claims portal", vec![SIGN_IN, REGISTER, QUIT]).prompt(),
            to_login(),
            Flow::Quit
        );
        match choice {
            REGISTER => return Ok(Flow::Goto(routes::REGISTER.to_string())),
            QUIT => return Ok(Flow::Quit),
            _ => {}
        }

        let username = ask!(Text::new("Username:").prompt(), to_login(), Flow::Quit);
        let password = ask!(
            Password::new("Password:")
                .without_confirmation()
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt(),
            to_login(),
            Flow::Quit
        );
        let credentials = Credentials {
            username: username.trim().to_string(),
            password,
        };
        match with_spinner("Signing in", self.auth.login(credentials)).await {
            Ok(_) => {
                let state = gate.on_login()?;
                notice(&format!("Signed in as {}.", state));
                Ok(Flow::Goto(routes::ROOT.to_string()))
            }
            Err(e) => {
                show_error(&e.user_message("An error occurred during login"));
                Ok(to_login())
            }
        }
    }

    async fn register_screen(&self) -> Result<Flow, DomainError> {
        heading("Register");
        let username = ask!(Text::new("Username:").prompt(), to_login(), Flow::Quit);
        let password = ask!(
            Password::new("Password:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt(),
            to_login(),
            Flow::Quit
        );
        let email = ask!(Text::new("Email:").prompt(), to_login(), Flow::Quit);
        let mobile = ask!(Text::new("Mobile:").prompt(), to_login(), Flow::Quit);
        let first_name = ask!(Text::new("First name:").prompt(), to_login(), Flow::Quit);
        let last_name = ask!(Text::new("Last name:").prompt(), to_login(), Flow::Quit);
        let age = ask!(Text::new("Age:").prompt(), to_login(), Flow::Quit);
        let form = RegistrationForm {
            username: username.trim().to_string(),
            password,
            email: email.trim().to_string(),
            mobile: mobile.trim().to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            age,
        };
        match with_spinner("Registering", self.auth.register(form)).await {
            Ok(()) => {
                notice("Registration successful. An admin has to verify your account before you can sign in.");
                Ok(to_login())
            }
            Err(e) => {
                show_error(&e.user_message("An error occurred during registration"));
                Ok(Flow::Goto(routes::REGISTER.to_string()))
            }
        }
    }

    /// Mount a dashboard. A failed mount ends in a forced logout.
    async fn mount<P: Panel>(
        &self,
        gate: &mut AuthorizationGate,
        expected: AuthorizationState,
    ) -> Result<Option<Dashboard<P>>, DomainError> {
        let mounted = with_spinner(
            "Loading dashboard",
            Dashboard::<P>::mount(self.store.as_ref(), self.api.as_ref(), expected),
        )
        .await;
        match mounted {
            Ok(dash) => Ok(Some(dash)),
            Err(e) => {
                show_error(&e.user_message("Failed to fetch user details. Please try again."));
                gate.force_logout(&e)?;
                Ok(None)
            }
        }
    }

    async fn admin_dashboard(
        &self,
        gate: &mut AuthorizationGate,
        section: Option<AdminSection>,
    ) -> Result<Flow, DomainError> {
        let Some(mut dash) = self
            .mount::<AdminPanel>(gate, AuthorizationState::AuthenticatedAdmin)
            .await?
        else {
            return Ok(to_login());
        };
        heading("Admin Dashboard");
        notice(&dash.greeting());

        let mut deep_link = section.map(AdminPanel::from);
        loop {
            let panel = match deep_link.take() {
                Some(panel) => panel,
                None => match sidebar::<AdminPanel>("Admin Dashboard")? {
                    SidebarChoice::Panel(panel) => panel,
                    SidebarChoice::Logout => {
                        gate.logout()?;
                        return Ok(to_login());
                    }
                    SidebarChoice::Quit => return Ok(Flow::Quit),
                },
            };
            let ticket = dash.select(panel);
            heading(panel.label());
            let exit = match panel {
                AdminPanel::Details => admin_panels::details(&dash),
                AdminPanel::ConfirmUser => {
                    admin_panels::confirm_user(&self.admin, &dash, ticket).await?
                }
                AdminPanel::ApproveClaim => {
                    admin_panels::approve_claim(&self.admin, &dash, ticket).await?
                }
                AdminPanel::Policyholders => {
                    admin_panels::policyholders(&self.admin, &dash, ticket).await?
                }
            };
            if let Some(flow) = settle(gate, &mut dash, exit)? {
                return Ok(flow);
            }
        }
    }

    async fn user_dashboard(&self, gate: &mut AuthorizationGate) -> Result<Flow, DomainError> {
        let Some(mut dash) = self
            .mount::<UserPanel>(gate, AuthorizationState::AuthenticatedUser)
            .await?
        else {
            return Ok(to_login());
        };
        heading("User Dashboard");
        notice(&dash.greeting());

        loop {
            let panel = match sidebar::<UserPanel>("User Dashboard")? {
                SidebarChoice::Panel(panel) => panel,
                SidebarChoice::Logout => {
                    gate.logout()?;
                    return Ok(to_login());
                }
                SidebarChoice::Quit => return Ok(Flow::Quit),
            };
            let ticket = dash.select(panel);
            heading(panel.label());
            let svc = self.policyholders.as_ref();
            let exit = match panel {
                UserPanel::Details => user_panels::details(&dash),
                UserPanel::AddPolicy => user_panels::add_policy(svc, &dash, ticket).await?,
                UserPanel::UpdatePolicy => user_panels::update_policy(svc, &dash, ticket).await?,
                UserPanel::DeletePolicy => user_panels::delete_policy(svc, &dash, ticket).await?,
                UserPanel::ViewPolicy => user_panels::view_policy(svc, &dash, ticket).await?,
                UserPanel::ApplyClaim => user_panels::apply_claim(svc, &dash, ticket).await?,
            };
            if let Some(flow) = settle(gate, &mut dash, exit)? {
                return Ok(flow);
            }
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self, start_path: &str) -> Result<(), DomainError> {
        let mut gate = AuthorizationGate::new(Arc::clone(&self.store));
        let mut target = start_path.to_string();
        loop {
            let screen = match gate.navigate(&target) {
                Navigation::Pending => {
                    gate.initialize()?;
                    continue;
                }
                Navigation::Render { screen, .. } => screen,
                Navigation::Redirected {
                    requested, path, screen,
                } => {
                    debug!(requested = %requested, path, "navigation redirected");
                    screen
                }
            };
            let flow = match screen {
                Screen::Login => self.login_screen(&mut gate).await?,
                Screen::Register => self.register_screen().await?,
                Screen::UserDashboard => self.user_dashboard(&mut gate).await?,
                Screen::AdminDashboard(section) => self.admin_dashboard(&mut gate, section).await?,
            };
            match flow {
                Flow::Goto(path) => target = path,
                Flow::Quit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_maps_cancel_and_interrupt() {
        assert!(matches!(
            answer::<u8>(Err(InquireError::OperationCanceled)),
            Ok(Answer::Back)
        ));
        assert!(matches!(
            answer::<u8>(Err(InquireError::OperationInterrupted)),
            Ok(Answer::Quit)
        ));
        assert!(matches!(answer(Ok(3)), Ok(Answer::Given(3))));
        assert!(matches!(
            answer::<u8>(Err(InquireError::NotTTY)),
            Err(DomainError::Ui(_))
        ));
    }

    #[test]
    fn test_report_splits_logout_from_inline_errors() {
        assert!(matches!(
            report(DomainError::MissingSession, "x"),
            PanelExit::ForceLogout(DomainError::MissingSession)
        ));
        let exit = report(
            DomainError::Server {
                status: 500,
                message: None,
            },
            "Failed to fetch users",
        );
        assert!(matches!(exit, PanelExit::Done));
    }
}
