const SAVE_PREFIX: &str = "/salvar";
const RECALL_PREFIX: &str = "/recuperar";

/// What a chat message asks for.
///
/// `/salvar categoria:chave:valor` stores a knowledge entry (the value may
/// itself contain `:`), `/recuperar categoria:chave` reads one back.
/// Anything else, malformed commands included, is a plain message for the
/// model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save {
        category: String,
        key: String,
        value: String,
    },
    Recall {
        category: String,
        key: String,
    },
    Message(String),
}

impl Command {
    pub fn parse(message: &str) -> Self {
        if message.starts_with(SAVE_PREFIX) {
            let parts: Vec<&str> = message.split(':').collect();
            if parts.len() >= 3 {
                return Command::Save {
                    category: parts[0].replace(SAVE_PREFIX, "").trim().to_string(),
                    key: parts[1].trim().to_string(),
                    value: parts[2..].join(":").trim().to_string(),
                };
            }
        }

        if message.starts_with(RECALL_PREFIX) {
            let parts: Vec<&str> = message.split(':').collect();
            if parts.len() == 2 {
                return Command::Recall {
                    category: parts[0].replace(RECALL_PREFIX, "").trim().to_string(),
                    key: parts[1].trim().to_string(),
                };
            }
        }

        Command::Message(message.to_string())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Save { .. } => "save",
            Command::Recall { .. } => "recall",
            Command::Message(_) => "message",
        }
    }
}
