//! `hotelgate-routing`: guards, post-login routing and logout.
//!
//! Everything here is independent of a rendering surface: navigation goes
//! through a [`Navigator`], reachability through a [`ReachabilityProbe`] and
//! session state through a [`hotelgate_session::SessionManager`].

pub mod config;
pub mod flow;
pub mod guard;
pub mod login_flow;
pub mod logout;
pub mod navigator;
pub mod probe;
pub mod route_map;
pub mod router;

pub use config::{ConfigError, GateConfig, LinkScope, ProbeKind};
pub use flow::{DenyReason, FlowError, FlowEvent, FlowMachine, FlowState};
pub use guard::{Guard, GuardState, GuardView, Verdict, decide};
pub use login_flow::LoginFlow;
pub use logout::{REVOKE_TIMEOUT, logout};
pub use navigator::{Navigator, RecordingNavigator};
pub use probe::{HealthProbe, OpaqueProbe, ProbeError, ProbePolicy, ReachabilityProbe, probe_with_policy};
pub use route_map::RoleRouteMap;
pub use router::{RoleRouter, RouterConfig, RoutingOutcome, ServiceLink};
