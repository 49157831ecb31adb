//! # Script interpreter module
//!
//! This module provides an interpreter for timed event scripts. A script is a
//! text file of entries of the form
//!
//! ```text
//! <exec_time_s>: <json payload>;
//! ```
//!
//! Each payload is deserialised into the event type chosen by the user of the
//! interpreter. Lines that do not match the entry pattern (blank lines,
//! comments) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event which is scripted to occur at a specific time.
struct ScriptedEvent<T> {
    /// The time the event is supposed to execute at
    exec_time_s: f64,

    /// The event itself
    event: T
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_events` to acquire a list of events that are due.
pub struct ScriptInterpreter<T> {
    _script_path: Option<PathBuf>,
    events: VecDeque<ScriptedEvent<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid event at {0} s: {1}")]
    InvalidEvent(f64, serde_json::Error),

    #[error("Script events must be in time order, found {1} s after {0} s")]
    OutOfOrder(f64, f64)
}

/// Events returned by the interpreter for the current time.
#[derive(Debug, PartialEq)]
pub enum PendingEvents<T> {
    None,
    Some(Vec<T>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T> 
where
    T: DeserializeOwned
{

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script_str(&script)?;
        si._script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of events
        let mut queue: VecDeque<ScriptedEvent<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            // Group 1 and 3 are not optional so are always present in a match
            let exec_time_str = &cap[1];
            let payload_str = &cap[3];

            // Parse the exec time
            let exec_time_s: f64 = exec_time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = queue.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(prev.exec_time_s, exec_time_s))
                }
            }

            // The scripts contain JSON only.
            let event = serde_json::from_str(payload_str)
                .map_err(|e| ScriptError::InvalidEvent(exec_time_s, e))?;

            queue.push_back(ScriptedEvent {
                exec_time_s,
                event
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: None,
            events: queue
        })
    }

    /// Return all events whose execution time is at or before
    /// `current_time_s`.
    pub fn get_pending_events(&mut self, current_time_s: f64) -> PendingEvents<T> {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.events.is_empty() {
            return PendingEvents::EndOfScript
        }

        let mut event_vec: Vec<T> = vec![];

        // Pop events from the head of the queue while they are due
        while self.events.front().map(|e| e.exec_time_s <= current_time_s) == Some(true) {
            if let Some(e) = self.events.pop_front() {
                event_vec.push(e.event);
            }
        }

        if event_vec.is_empty() {
            PendingEvents::None
        }
        else {
            PendingEvents::Some(event_vec)
        }
    }

    /// Get the number of events remaining in the script
    pub fn get_num_events(&self) -> usize {
        self.events.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.events.back() {
            Some(e) => e.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = "
        0.0: \"start\";
        // comments and blank lines are skipped

        0.5: \"press\";
        0.5: \"hold\";
        2: \"release\";
    ";

    #[test]
    fn test_pending_events() {
        let mut si: ScriptInterpreter<String> = ScriptInterpreter::from_script_str(SCRIPT)
            .unwrap();

        assert_eq!(si.get_num_events(), 4);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending_events(0.0), PendingEvents::Some(vec!["start".to_string()]));
        assert_eq!(si.get_pending_events(0.2), PendingEvents::None);
        assert_eq!(
            si.get_pending_events(1.0),
            PendingEvents::Some(vec!["press".to_string(), "hold".to_string()])
        );
        assert_eq!(si.get_pending_events(5.0), PendingEvents::Some(vec!["release".to_string()]));
        assert_eq!(si.get_pending_events(6.0), PendingEvents::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        let empty: Result<ScriptInterpreter<String>, _> = 
            ScriptInterpreter::from_script_str("nothing here");
        assert!(matches!(empty, Err(ScriptError::ScriptEmpty)));

        let bad_json: Result<ScriptInterpreter<String>, _> =
            ScriptInterpreter::from_script_str("1.0: not json;");
        assert!(matches!(bad_json, Err(ScriptError::InvalidEvent(_, _))));

        let out_of_order: Result<ScriptInterpreter<String>, _> =
            ScriptInterpreter::from_script_str("1.0: \"a\";\n0.5: \"b\";");
        assert!(matches!(out_of_order, Err(ScriptError::OutOfOrder(_, _))));
    }
}
