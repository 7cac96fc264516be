use crate::pool::ChatterMeta;
use rand::Rng;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

pub const TWITCH_IRC_ADDR: &str = "irc.chat.twitch.tv:6667";

/// One chat message from the channel, with the role metadata the pool keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEvent {
    pub login: String,
    pub text: String,
    pub meta: ChatterMeta,
}

/// A raw IRC line we care about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatLine {
    Message(ChatEvent),
    /// Server keep-alive; the payload must be echoed back in a PONG.
    Ping(String),
}

/// Parse one IRC-v3 line as received from the chat server.
///
/// Recognizes tagged `PRIVMSG` lines for the given channel
/// (`@mod=1;subscriber=0;color=#FF0000;... :nick!user@host PRIVMSG #chan :text`)
/// and `PING` keep-alives. Everything else (JOIN acks, numerics, notices)
/// yields `None`.
pub fn parse_line(line: &str, channel: &str) -> Option<ChatLine> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(payload) = line.strip_prefix("PING :") {
        return Some(ChatLine::Ping(payload.to_string()));
    }

    let (tags, rest) = match line.strip_prefix('@') {
        Some(tagged) => {
            let (tags, rest) = tagged.split_once(' ')?;
            (tags, rest)
        }
        None => ("", line),
    };

    let prefix = rest.strip_prefix(':')?;
    let (source, command_part) = prefix.split_once(' ')?;
    let login = source.split('!').next()?;

    let (command, params) = command_part.split_once(' ')?;
    if command != "PRIVMSG" {
        return None;
    }
    let (chan, text) = params.split_once(" :")?;
    if chan.strip_prefix('#')? != channel {
        return None;
    }

    let mut meta = ChatterMeta::default();
    for tag in tags.split(';') {
        let Some((key, value)) = tag.split_once('=') else {
            continue;
        };
        match key {
            "mod" => meta.is_moderator = value == "1",
            "subscriber" => meta.is_subscriber = value == "1",
            "color" => meta.display_color = value.to_string(),
            // The broadcaster and founders carry their role in badges, not
            // in the mod/subscriber tags.
            "badges" => {
                if value.contains("broadcaster/") {
                    meta.is_moderator = true;
                }
                if value.contains("founder/") {
                    meta.is_subscriber = true;
                }
            }
            _ => {}
        }
    }

    Some(ChatLine::Message(ChatEvent {
        login: login.to_string(),
        text: text.to_string(),
        meta,
    }))
}

/// Transport half-pair for a live chat connection.
pub struct ChatConnection {
    pub reader: BufReader<TcpStream>,
    pub writer: TcpStream,
}

/// Join a channel's chat anonymously and request message tags.
pub fn connect(channel: &str) -> io::Result<ChatConnection> {
    let stream = TcpStream::connect(TWITCH_IRC_ADDR)?;
    let mut writer = stream.try_clone()?;
    let nick = format!("justinfan{}", rand::thread_rng().gen_range(10_000..100_000));
    write!(
        writer,
        "CAP REQ :twitch.tv/tags twitch.tv/commands\r\nNICK {nick}\r\nJOIN #{channel}\r\n"
    )?;
    writer.flush()?;
    Ok(ChatConnection {
        reader: BufReader::new(stream),
        writer,
    })
}

/// Read chat lines on a background thread and push parsed events into the
/// channel. The stream is unbounded; the thread ends when the reader hits
/// EOF/an error or when the receiving side hangs up. Keep-alives are
/// answered through `pong` when a writer is supplied.
pub fn spawn_reader<R, W>(
    reader: R,
    mut pong: Option<W>,
    channel: String,
    tx: Sender<ChatEvent>,
) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else {
                log::warn!("chat stream closed");
                break;
            };
            match parse_line(&line, &channel) {
                Some(ChatLine::Ping(payload)) => {
                    if let Some(w) = pong.as_mut()
                        && write!(w, "PONG :{payload}\r\n").and_then(|()| w.flush()).is_err()
                    {
                        log::warn!("failed to answer keep-alive, stopping chat reader");
                        break;
                    }
                }
                Some(ChatLine::Message(event)) => {
                    log::debug!("chat: {} said {:?}", event.login, event.text);
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                None => {}
            }
        }
    })
}
