//! Line-driven event loop standing in for the desktop button presses.
//!
//! Each input line is one user action applied to a single [`DispatchSession`].
//! Handler failures are printed and the loop keeps going, so "not computed
//! yet" and "computation failed" stay distinguishable.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use dispatch_core::config::DispatchConfig;
use dispatch_core::report::DispatchReport;
use dispatch_core::routing::RouteProvider;
use dispatch_core::session::DispatchSession;
use rand::Rng;

const HELP: &str = "commands: detect | assign | route | status | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Detect,
    Assign,
    Route,
    Status,
    Help,
    Quit,
}

impl FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detect" | "d" => Ok(Event::Detect),
            "assign" | "a" => Ok(Event::Assign),
            "route" | "r" => Ok(Event::Route),
            "status" | "s" => Ok(Event::Status),
            "help" | "h" | "?" => Ok(Event::Help),
            "quit" | "q" | "exit" => Ok(Event::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// Run the event loop until `quit` or end of input.
pub fn run<R, W, G>(
    input: R,
    out: &mut W,
    config: &DispatchConfig,
    provider: &dyn RouteProvider,
    rng: &mut G,
) -> io::Result<DispatchSession>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let mut session = DispatchSession::new();
    writeln!(out, "{}", HELP)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = match line.parse::<Event>() {
            Ok(event) => event,
            Err(msg) => {
                writeln!(out, "{}. {}", msg, HELP)?;
                continue;
            }
        };

        match event {
            Event::Detect => {
                let incident = session.detect_accident(rng, &config.region);
                writeln!(out, "Accident detected at {}", incident)?;
            }
            Event::Assign => match session.check_availability(&config.roster) {
                Ok(assignment) => writeln!(
                    out,
                    "Nearest ambulance {} assigned, hospital {}",
                    assignment.ambulance, assignment.hospital
                )?,
                Err(err) => writeln!(out, "error: {}", err)?,
            },
            Event::Route => match session.plan_routes(provider).map(|_| ()) {
                Ok(()) => write!(out, "{}", DispatchReport::from_session(&session, false))?,
                Err(err) => writeln!(out, "error: {}", err)?,
            },
            Event::Status => write!(out, "{}", DispatchReport::from_session(&session, false))?,
            Event::Help => writeln!(out, "{}", HELP)?,
            Event::Quit => break,
        }
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::routing::{GeodesicRouteProvider, RoutingError};
    use dispatch_core::test_helpers::StubRouteProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn drive(script: &str, provider: &dyn RouteProvider) -> (String, DispatchSession) {
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let session = run(
            Cursor::new(script.to_string()),
            &mut out,
            &DispatchConfig::default(),
            provider,
            &mut rng,
        )
        .expect("event loop");
        (String::from_utf8(out).expect("utf8"), session)
    }

    #[test]
    fn parses_event_aliases() {
        assert_eq!("D".parse::<Event>(), Ok(Event::Detect));
        assert_eq!(" route ".parse::<Event>(), Ok(Event::Route));
        assert_eq!("exit".parse::<Event>(), Ok(Event::Quit));
        assert!("launch".parse::<Event>().is_err());
    }

    #[test]
    fn out_of_order_events_report_missing_inputs() {
        let (text, session) = drive("assign\nroute\n", &GeodesicRouteProvider::default());
        assert!(text.contains("error: no incident has been detected yet"));
        assert!(session.incident().is_none());
    }

    #[test]
    fn full_script_produces_plan() {
        let (text, session) = drive("detect\nassign\nroute\nquit\nstatus\n", &GeodesicRouteProvider::default());
        assert!(text.contains("Accident detected at"));
        assert!(text.contains("Ambulance → Accident:"));
        assert!(session.plan().is_some());
        // Nothing after quit is processed.
        assert_eq!(text.matches("Accident location:").count(), 1);
    }

    #[test]
    fn routing_failure_is_printed_and_loop_continues() {
        let provider = StubRouteProvider::failing(RoutingError::Network("refused".to_string()));
        let (text, session) = drive("detect\nassign\nroute\nstatus\n", &provider);
        assert!(text.contains("error: routing failed: network error: refused"));
        assert!(text.contains("Routes: not planned"));
        assert!(session.assignment().is_some());
    }

    #[test]
    fn unknown_command_shows_help() {
        let (text, _) = drive("launch\n", &GeodesicRouteProvider::default());
        assert!(text.contains("unknown command 'launch'"));
    }
}
