use std::{
    io::{BufRead, BufReader, Write},
    net::TcpStream,
};

use color_eyre::{
    eyre::{eyre, Report},
    Result,
};
use heos_decode::{heos, DecodeError, Record, Response};
use tracing::{debug, trace, warn};

pub(crate) const DEFAULT_PORT: u16 = 1255;

pub(crate) struct Session {
    host: String,
    port: u16,
    stream: Option<BufReader<TcpStream>>,
}

impl Session {
    pub(crate) fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            stream: None,
        }
    }

    fn connect(&mut self) -> Result<&mut BufReader<TcpStream>> {
        if self.stream.is_none() {
            debug!(host = %self.host, port = self.port, "connecting to heos");
            let stream = TcpStream::connect((self.host.as_str(), self.port))?;
            self.stream = Some(BufReader::new(stream));
        }
        self.stream
            .as_mut()
            .ok_or_else(|| eyre!("heos session is not connected"))
    }

    /// Sends one command and returns the final reply to it, whatever its result.
    ///
    /// A broken connection is dropped so the next command reconnects.
    pub(crate) fn exchange(&mut self, command: &str) -> Result<Response> {
        let command = command.trim().trim_start_matches("heos://");
        let path = command.split('?').next().unwrap_or_default().to_owned();
        let session = self.connect()?;
        debug!(command, "sending heos command");
        let result = write!(session.get_mut(), "heos://{command}\r\n")
            .map_err(Report::from)
            .and_then(|()| read_reply(session, &path));
        if let Err(err) = &result {
            if err.downcast_ref::<DecodeError>().is_none() {
                debug!(%err, "dropping heos connection");
                self.stream = None;
            }
        }
        result
    }

    /// Like [`Session::exchange`], but a `fail` result becomes an error.
    pub(crate) fn request(&mut self, command: &str) -> Result<Response> {
        let response = self.exchange(command)?;
        if let Some(err) = response.heos.error() {
            warn!(command = %response.heos.command, %err, "heos command failed");
            return Err(eyre!("{} failed: {err}", response.heos.command));
        }
        Ok(response)
    }

    pub(crate) fn get_players(&mut self) -> Result<Vec<Record>> {
        Ok(self.request("player/get_players")?.payload)
    }

    pub(crate) fn first_player_id(&mut self) -> Result<i64> {
        let players = self.get_players()?;
        let player = players
            .first()
            .ok_or_else(|| eyre!("no players were returned from heos"))?;
        let pid = player
            .get("pid")
            .ok_or_else(|| eyre!("player entry has no pid: {player:?}"))?;
        Ok(pid.parse()?)
    }

    pub(crate) fn play_url(&mut self, pid: Option<i64>, url: &str) -> Result<()> {
        let pid = match pid {
            Some(pid) => pid,
            None => self.first_player_id()?,
        };
        self.request(&format!("browse/play_stream?pid={pid}&url={url}"))?;
        Ok(())
    }
}

/// Reads `\r\n`-framed responses until the final reply to `path` arrives.
///
/// Events and `command under process` acknowledgements are skipped, as are
/// replies to other commands.
fn read_reply(reader: &mut impl BufRead, path: &str) -> Result<Response> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Err(eyre!("heos connection closed while waiting for {path}"));
        }
        let frame = line.strip_suffix(b"\n").unwrap_or(&line[..]);
        let frame = frame.strip_suffix(b"\r").unwrap_or(frame);
        let response = match heos::decode(frame) {
            Ok(response) => response,
            Err(DecodeError::MalformedMessage { message })
                if message.starts_with(heos::UNDER_PROCESS) =>
            {
                trace!(path, "command under process");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if response.is_event() || response.is_under_process() {
            trace!(command = %response.heos.command, "skipping interim response");
            continue;
        }
        if response.heos.command.to_string() != path {
            trace!(command = %response.heos.command, "skipping reply to another command");
            continue;
        }
        return Ok(response);
    }
}
