use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{load_settings, EventGateway, HttpEventGateway, ImageUpload};
use shared::{
    domain::{parse_timestamp, Event, EventFields, EventId},
    filter::{apply_filters, FilterCriteria},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "events", author, version, about = "Manage events from the command line")]
struct Args {
    /// Overrides the API base URL from events_client.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch events and print the ones matching the filters.
    List {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Only events active at this instant (YYYY-MM-DDTHH:MM).
        #[arg(long, value_parser = parse_instant)]
        at: Option<NaiveDateTime>,
        #[arg(long)]
        json: bool,
    },
    Create {
        #[command(flatten)]
        fields: NewEventArgs,
        #[arg(long)]
        image: PathBuf,
    },
    /// Update an event; omitted fields keep their current values.
    Update {
        id: i64,
        #[command(flatten)]
        fields: EventPatchArgs,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete {
        id: i64,
    },
}

#[derive(ClapArgs, Debug)]
struct NewEventArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category: String,
}

impl From<NewEventArgs> for EventFields {
    fn from(args: NewEventArgs) -> Self {
        EventFields {
            event_name: args.name,
            start_time: args.start,
            end_time: args.end,
            location: args.location,
            description: args.description,
            category: args.category,
        }
    }
}

#[derive(ClapArgs, Debug, Default)]
struct EventPatchArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

impl EventPatchArgs {
    fn apply_to(self, mut fields: EventFields) -> EventFields {
        if let Some(v) = self.name {
            fields.event_name = v;
        }
        if let Some(v) = self.start {
            fields.start_time = v;
        }
        if let Some(v) = self.end {
            fields.end_time = v;
        }
        if let Some(v) = self.location {
            fields.location = v;
        }
        if let Some(v) = self.description {
            fields.description = v;
        }
        if let Some(v) = self.category {
            fields.category = v;
        }
        fields
    }
}

fn parse_instant(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognized date/time '{raw}'"))
}

fn find_event(events: Vec<Event>, id: EventId) -> Result<Event> {
    match events.into_iter().find(|event| event.id == id) {
        Some(event) => Ok(event),
        None => bail!("no event with id {id}"),
    }
}

fn select_events(all: &[Event], criteria: &FilterCriteria) -> Vec<Event> {
    let events = apply_filters(all, criteria);
    info!(total = all.len(), shown = events.len(), "cli: listed events");
    events
}

fn format_event_line(event: &Event) -> String {
    format!(
        "#{} {} | {} -> {} | {} | {}",
        event.id, event.name, event.start_time, event.end_time, event.location, event.category
    )
}

fn load_image(path: &Path) -> Result<ImageUpload> {
    ImageUpload::from_path(path).with_context(|| format!("cannot use image {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(raw) = args.api_base_url.as_deref() {
        settings = settings.with_api_base_url(raw)?;
    }
    let gateway = HttpEventGateway::from_settings(&settings)?;
    info!(api_base_url = %settings.api_base_url, "cli: using backend");

    match args.command {
        Command::List {
            location,
            category,
            at,
            json,
        } => {
            let criteria = FilterCriteria {
                location: location.unwrap_or_default(),
                category: category.unwrap_or_default(),
                instant: at,
            };
            let events = select_events(&gateway.list_events().await?, &criteria);
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("No events found");
            } else {
                for event in &events {
                    println!("{}", format_event_line(event));
                }
            }
        }
        Command::Create { fields, image } => {
            let image = load_image(&image)?;
            info!(name = %fields.name, image = %image.filename, "cli: creating event");
            gateway.create_event(fields.into(), Some(image)).await?;
            println!("Event created successfully");
        }
        Command::Update { id, fields, image } => {
            let target = find_event(gateway.list_events().await?, EventId(id))?;
            let image = image.as_deref().map(load_image).transpose()?;
            let fields = fields.apply_to(target.to_fields());
            info!(event_id = id, new_image = image.is_some(), "cli: updating event");
            gateway.update_event(&target, fields, image).await?;
            println!("Event updated successfully");
        }
        Command::Delete { id } => {
            info!(event_id = id, "cli: deleting event");
            gateway.delete_event(EventId(id)).await?;
            println!("Event deleted successfully");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn event(id: i64) -> Event {
        Event {
            id: EventId(id),
            name: "Expo".into(),
            start_time: "Thu, 01 Feb 2024 09:00:00 GMT".into(),
            end_time: "Sat, 03 Feb 2024 18:00:00 GMT".into(),
            location: "Vadodara".into(),
            description: "Trade expo".into(),
            category: "Exhibition".into(),
            image_ref: Some("/uploads/expo.png".into()),
        }
    }

    #[test]
    fn parses_list_filters() {
        let args = Args::try_parse_from([
            "events",
            "list",
            "--location",
            "Ahmedabad",
            "--at",
            "2024-01-01T10:00",
        ])
        .expect("valid args");

        match args.command {
            Command::List {
                location,
                category,
                at,
                json,
            } => {
                assert_eq!(location.as_deref(), Some("Ahmedabad"));
                assert_eq!(category, None);
                assert_eq!(at, parse_timestamp("2024-01-01T10:00"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_instant() {
        assert!(Args::try_parse_from(["events", "list", "--at", "soon"]).is_err());
    }

    #[test]
    fn create_requires_every_field_and_an_image() {
        assert!(Args::try_parse_from(["events", "create", "--name", "Launch"]).is_err());

        let args = Args::try_parse_from([
            "events",
            "--api-base-url",
            "http://localhost:8000",
            "create",
            "--name",
            "Launch",
            "--start",
            "2024-03-01T18:00",
            "--end",
            "2024-03-01T21:00",
            "--location",
            "Gandhinagar",
            "--description",
            "Product launch",
            "--category",
            "Business",
            "--image",
            "banner.png",
        ])
        .expect("valid args");
        assert_eq!(args.api_base_url.as_deref(), Some("http://localhost:8000"));
        match args.command {
            Command::Create { fields, image } => {
                let fields = EventFields::from(fields);
                assert_eq!(fields.event_name, "Launch");
                assert_eq!(fields.location, "Gandhinagar");
                assert_eq!(image, PathBuf::from("banner.png"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_patch_keeps_unspecified_fields() {
        let patch = EventPatchArgs {
            location: Some("Ahmedabad".into()),
            ..Default::default()
        };

        let fields = patch.apply_to(event(3).to_fields());

        assert_eq!(fields.location, "Ahmedabad");
        assert_eq!(fields.event_name, "Expo");
        assert_eq!(fields.start_time, "2024-02-01T09:00");
    }

    #[test]
    fn finds_update_target_by_id() {
        let found = find_event(vec![event(1), event(2)], EventId(2)).expect("present");
        assert_eq!(found.id, EventId(2));

        let err = find_event(vec![event(1)], EventId(9)).expect_err("missing");
        assert_eq!(err.to_string(), "no event with id 9");
    }

    #[test]
    fn listing_logs_how_many_events_matched() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let criteria = FilterCriteria {
            location: "Ahmedabad".into(),
            ..Default::default()
        };

        let shown = tracing::subscriber::with_default(subscriber, || {
            select_events(&[event(1), event(2)], &criteria)
        });

        assert!(shown.is_empty());
        let output = String::from_utf8(logs.0.lock().expect("log buffer").clone()).expect("utf8");
        assert!(output.contains("cli: listed events"), "{output}");
        assert!(output.contains("total=2"), "{output}");
        assert!(output.contains("shown=0"), "{output}");
    }

    #[test]
    fn formats_one_line_per_event() {
        assert_eq!(
            format_event_line(&event(4)),
            "#4 Expo | Thu, 01 Feb 2024 09:00:00 GMT -> Sat, 03 Feb 2024 18:00:00 GMT | Vadodara | Exhibition"
        );
    }
}
