use clap::Args;
use siteops::mail::{self, Message};
use siteops::settings::Settings;
use siteops::{Error, Result};
use std::io::Read;

#[derive(Args)]
pub struct SendMailArgs {
    /// Message subject
    #[arg(long)]
    subject: String,

    /// Sender address
    #[arg(long = "from", value_name = "EMAIL")]
    from_email: String,

    /// Sender display name (defaults to the configured one)
    #[arg(long)]
    from_name: Option<String>,

    /// Recipient (repeatable)
    #[arg(long = "to", value_name = "EMAIL", required = true)]
    to: Vec<String>,

    /// Cc recipient (repeatable)
    #[arg(long = "cc", value_name = "EMAIL")]
    cc: Vec<String>,

    /// Bcc recipient (repeatable)
    #[arg(long = "bcc", value_name = "EMAIL")]
    bcc: Vec<String>,

    /// Message body; read from stdin when omitted
    #[arg(long)]
    body: Option<String>,
}

pub fn run(args: SendMailArgs) -> Result<()> {
    let settings = Settings::load()?;
    if settings.mail.api_key.is_empty() {
        return Err(Error::Config(
            "mail.apiKey is not set in siteops.json".to_string(),
        ));
    }

    let body = match args.body {
        Some(body) => body,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let msg = Message {
        subject: args.subject,
        body,
        from_email: args.from_email,
        from_name: args
            .from_name
            .unwrap_or_else(|| settings.mail.from_name.clone()),
        to: args.to,
        cc: args.cc,
        bcc: args.bcc,
    };

    mail::send(&settings.mail, &msg)
}
