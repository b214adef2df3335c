//! Command verbs
//!
//! Maps the text after the command marker to a `Verb`, and holds the help
//! catalogue. Lookup order: exact verb match, then escaped text (a second
//! marker), then unknown.

/// Marker that starts every command
pub const COMMAND_MARKER: char = '/';

/// Recognized command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    About,
    Away,
    Back,
    Cancel,
    Clear,
    Help,
    Msg,
    Nick,
    Quit,
    Receive,
    Reject,
    Send,
    Topic,
    Transfers,
    Users,
    Whois,
}

/// Table entry for one verb
#[derive(Debug, Clone, Copy)]
pub struct VerbSpec {
    pub verb: Verb,
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

/// Every verb, in help order
pub const VERBS: &[VerbSpec] = &[
    VerbSpec { verb: Verb::About, name: "about", usage: "", summary: "information about the application" },
    VerbSpec { verb: Verb::Away, name: "away", usage: "<away message>", summary: "set status to away" },
    VerbSpec { verb: Verb::Back, name: "back", usage: "", summary: "set status to not away" },
    VerbSpec { verb: Verb::Cancel, name: "cancel", usage: "<nick> <id>", summary: "cancel an ongoing file transfer with a user" },
    VerbSpec { verb: Verb::Clear, name: "clear", usage: "", summary: "clear all the text from the chat" },
    VerbSpec { verb: Verb::Help, name: "help", usage: "", summary: "show this help message" },
    VerbSpec { verb: Verb::Msg, name: "msg", usage: "<nick> <msg>", summary: "send a private message to a user" },
    VerbSpec { verb: Verb::Nick, name: "nick", usage: "<new nick>", summary: "changes your nick name" },
    VerbSpec { verb: Verb::Quit, name: "quit", usage: "", summary: "quit from the chat" },
    VerbSpec { verb: Verb::Receive, name: "receive", usage: "<nick> <id>", summary: "accept a file transfer request from a user" },
    VerbSpec { verb: Verb::Reject, name: "reject", usage: "<nick> <id>", summary: "reject a file transfer request from a user" },
    VerbSpec { verb: Verb::Send, name: "send", usage: "<nick> <file>", summary: "send a file to a user" },
    VerbSpec { verb: Verb::Topic, name: "topic", usage: "<optional new topic>", summary: "prints the current topic, or changes the topic" },
    VerbSpec { verb: Verb::Transfers, name: "transfers", usage: "", summary: "shows a list of all file transfers and their status" },
    VerbSpec { verb: Verb::Users, name: "users", usage: "", summary: "show the user list" },
    VerbSpec { verb: Verb::Whois, name: "whois", usage: "<nick>", summary: "show information about a user" },
];

impl Verb {
    /// Exact, case-sensitive lookup
    pub fn lookup(name: &str) -> Option<Verb> {
        VERBS.iter().find(|spec| spec.name == name).map(|spec| spec.verb)
    }

    /// The verb as typed
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Table entry for this verb
    pub fn spec(&self) -> &'static VerbSpec {
        VERBS
            .iter()
            .find(|spec| spec.verb == *self)
            .unwrap_or(&VERBS[0])
    }
}

/// A classified command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// A recognized verb and its raw argument string
    Run(Verb, &'a str),
    /// Text behind a doubled marker, with one marker removed
    Escaped(&'a str),
    /// Anything else, carrying the verb as typed
    Unknown(&'a str),
}

/// Split a raw line into verb and arguments and classify it.
///
/// The argument string keeps its leading separator; handlers trim as needed.
pub fn classify(line: &str) -> Command<'_> {
    let Some(body) = line.strip_prefix(COMMAND_MARKER) else {
        return Command::Unknown("");
    };

    let verb = match body.find(' ') {
        Some(end) => &body[..end],
        None => body,
    };

    if verb.is_empty() {
        return Command::Unknown(verb);
    }

    let args = &body[verb.len()..];

    match Verb::lookup(verb) {
        Some(known) => Command::Run(known, args),
        None if verb.starts_with(COMMAND_MARKER) => Command::Escaped(body),
        None => Command::Unknown(verb),
    }
}

/// The help catalogue, one line per verb plus the escape form
pub fn help_text(app_name: &str) -> String {
    let mut lines = vec![format!("{} commands:", app_name)];

    for spec in VERBS {
        let command = if spec.usage.is_empty() {
            format!("{}{}", COMMAND_MARKER, spec.name)
        } else {
            format!("{}{} {}", COMMAND_MARKER, spec.name, spec.usage)
        };

        let summary = if spec.verb == Verb::About {
            format!("information about {}", app_name)
        } else {
            spec.summary.to_string()
        };

        lines.push(format!("{} - {}", command, summary));
    }

    lines.push(format!(
        "{}{}<text> - send the text as a normal message, with a single slash",
        COMMAND_MARKER, COMMAND_MARKER
    ));

    lines.join("\n")
}
