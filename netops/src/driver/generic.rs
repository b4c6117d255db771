//! Generic driver implementation that works with any platform.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::CliSession;
use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::patterns::combine_patterns;
use crate::channel::{PtyChannel, PtyConfig};
use crate::error::{ChannelError, DriverError, Error, PlatformError, Result};
use crate::platform::{
    DefaultBehavior, FinalizeAction, FinalizeStep, PlatformDefinition, VendorBehavior,
};
use crate::transport::{Transport, TransportConfig};

/// Upper bound on privilege transitions for one acquisition.
const MAX_PRIVILEGE_HOPS: usize = 8;

/// Driver for any dialect described by a [`PlatformDefinition`].
///
/// Handles:
/// - Transport setup (SSH or Telnet)
/// - Prompt detection and output normalization
/// - Privilege level navigation, including enable passwords
/// - Commit/save finalization with optional confirmation prompts
pub struct GenericDriver {
    transport_config: TransportConfig,

    platform: PlatformDefinition,

    behavior: Arc<dyn VendorBehavior>,

    /// Interactive channel (None when disconnected).
    channel: Option<PtyChannel>,

    privilege_manager: PrivilegeManager,

    /// Timeout for each command's output.
    timeout: Duration,

    /// Matches the prompt of any privilege level.
    prompt_pattern: Regex,

    /// Answer to escalation password prompts.
    enable_secret: Option<SecretString>,
}

impl GenericDriver {
    /// Create a disconnected driver.
    ///
    /// Fails if the platform definition is inconsistent or its prompts do not
    /// combine into one pattern.
    pub fn new(transport_config: TransportConfig, platform: PlatformDefinition) -> Result<Self> {
        platform
            .validate()
            .map_err(|message| PlatformError::InvalidDefinition { message })?;

        let prompt_pattern = combine_patterns(platform.privilege_levels.values().map(|l| &l.pattern))
            .map_err(ChannelError::from)?;

        let behavior = platform
            .behavior
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultBehavior));

        let privilege_manager = PrivilegeManager::new(platform.privilege_levels.clone());

        Ok(Self {
            transport_config,
            platform,
            behavior,
            channel: None,
            privilege_manager,
            timeout: Duration::from_secs(30),
            prompt_pattern,
            enable_secret: None,
        })
    }

    /// Set how long to wait for each command's output.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the password sent when escalation asks for one.
    pub fn with_enable_secret(mut self, secret: Option<SecretString>) -> Self {
        self.enable_secret = secret;
        self
    }

    /// Get the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn host(&self) -> &str {
        &self.transport_config.host
    }

    /// Name of the privilege level shown by the last prompt.
    pub fn current_privilege(&self) -> Option<&str> {
        self.privilege_manager.current()
    }

    /// Connect, log in and bring the session to the default privilege.
    pub async fn open(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        debug!(
            "{}: connecting over {} as {}",
            self.transport_config.socket_addr(),
            self.transport_config.protocol,
            self.platform.name
        );

        let (transport, leftover) =
            Transport::connect(&self.transport_config, &self.prompt_pattern).await?;

        self.attach(transport, &leftover).await
    }

    /// Prepare a session on an already connected transport.
    ///
    /// `leftover` is output consumed before the driver took over (telnet login).
    pub(crate) async fn attach(&mut self, transport: Transport, leftover: &[u8]) -> Result<()> {
        let mut config = PtyConfig::default().for_protocol(transport.protocol());

        if let Some(ref return_char) = self.platform.return_char {
            config.return_char = return_char.clone();
        }

        let mut channel = PtyChannel::new(transport, config);
        channel.extend_buffer(leftover);
        self.channel = Some(channel);
        self.privilege_manager.reset();

        if let Err(e) = self.prepare().await {
            self.abort().await;
            return Err(e);
        }

        info!(
            "{}: session open ({}, {})",
            self.host(),
            self.platform.name,
            self.privilege_manager.current().unwrap_or("?")
        );
        Ok(())
    }

    async fn prepare(&mut self) -> Result<()> {
        let first_wait = self.transport_config.connect_timeout;

        let prompt = match self.read_until_prompt(first_wait).await {
            Ok((_, prompt)) => prompt,
            Err(Error::Channel(ChannelError::PatternTimeout(_))) => {
                // Some devices print nothing until they see a keypress
                debug!("{}: no prompt yet, sending return", self.host());
                self.channel_mut()?.send("").await?;
                self.read_until_prompt(first_wait).await?.1
            }
            Err(e) => return Err(e),
        };

        self.privilege_manager.update_from_prompt(&prompt)?;

        let default = self.platform.default_privilege.clone();
        self.acquire_privilege(&default).await?;

        for command in self.platform.on_open_commands.clone() {
            let response = self.send_command(&command).await?;
            if let Some(ref message) = response.failure_message {
                debug!("{}: on-open command '{}' rejected: {}", self.host(), command, message);
            }
        }

        Ok(())
    }

    /// Drop the channel after a failed open, ignoring close errors.
    async fn abort(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("{}: close after failed open: {}", self.host(), e);
            }
        }
        self.privilege_manager.reset();
    }

    fn channel_mut(&mut self) -> Result<&mut PtyChannel> {
        self.channel
            .as_mut()
            .ok_or_else(|| DriverError::NotConnected.into())
    }

    /// Split `data` at its last prompt: (output before the prompt, prompt).
    fn split_prompt(&self, data: &[u8]) -> (String, String) {
        match self.prompt_pattern.find_iter(data).last() {
            Some(m) => (
                String::from_utf8_lossy(&data[..m.start()]).into_owned(),
                String::from_utf8_lossy(m.as_bytes()).trim().to_string(),
            ),
            None => (String::from_utf8_lossy(data).into_owned(), String::new()),
        }
    }

    /// Read up to the next prompt and track the privilege level it shows.
    async fn read_until_prompt(&mut self, timeout: Duration) -> Result<(String, String)> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let data = channel.read_until(&self.prompt_pattern, timeout).await?;

        let (output, prompt) = self.split_prompt(&data);
        if self.privilege_manager.update_from_prompt(&prompt).is_err() {
            debug!("{}: prompt {:?} matches no privilege level", self.host(), prompt);
        }
        Ok((output, prompt))
    }

    fn detect_failure(&self, output: &str) -> Option<String> {
        if let Some(message) = self.behavior.detect_failure(output) {
            return Some(message);
        }

        self.platform
            .failed_when_contains
            .iter()
            .find_map(|pattern| {
                output
                    .lines()
                    .find(|line| line.contains(pattern.as_str()))
                    .map(|line| line.trim().to_string())
            })
    }

    fn clean_output(&self, raw: &str, command: &str) -> String {
        let normalized = self.behavior.normalize_output(raw, command);
        self.behavior.post_process_output(&normalized)
    }

    /// Walk the privilege graph to `target`.
    ///
    /// The prompt is re-read after every hop, so a transition that lands
    /// somewhere unexpected is routed from where the device actually is.
    pub async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        for _ in 0..MAX_PRIVILEGE_HOPS {
            let current = self
                .privilege_manager
                .current()
                .map(str::to_string)
                .ok_or_else(|| DriverError::PrivilegeAcquisitionFailed {
                    target: target.to_string(),
                })?;

            if current == target {
                return Ok(());
            }

            let path = self.privilege_manager.find_path(&current, target)?;
            let next = path[1].clone();

            let transition = self
                .privilege_manager
                .get_transition(&current, &next)
                .ok_or_else(|| DriverError::NoPrivilegePath {
                    from: current.clone(),
                    to: next.clone(),
                })?;

            debug!(
                "{}: privilege {} -> {} via '{}'",
                self.host(),
                current,
                next,
                transition.command
            );

            self.channel_mut()?.send(&transition.command).await?;

            match transition.auth_prompt {
                Some(auth) => self.answer_auth_prompt(&auth, &next).await?,
                None => {
                    self.read_until_prompt(self.timeout).await?;
                }
            }
        }

        Err(DriverError::PrivilegeAcquisitionFailed {
            target: target.to_string(),
        }
        .into())
    }

    /// Handle a transition that may ask for a password.
    async fn answer_auth_prompt(&mut self, auth: &Regex, next: &str) -> Result<()> {
        let either = combine_patterns([auth, &self.prompt_pattern]).map_err(ChannelError::from)?;
        let timeout = self.timeout;
        let data = self.channel_mut()?.read_until(&either, timeout).await?;

        if self.prompt_pattern.is_match(&data) {
            // no password asked
            let (_, prompt) = self.split_prompt(&data);
            let _ = self.privilege_manager.update_from_prompt(&prompt);
            return Ok(());
        }

        let failed = || DriverError::PrivilegeAcquisitionFailed {
            target: next.to_string(),
        };

        let secret = self
            .enable_secret
            .as_ref()
            .map(|s| s.expose_secret().to_string())
            .ok_or_else(failed)?;

        debug!("{}: answering password prompt for {}", self.host(), next);
        self.channel_mut()?.send(&secret).await?;
        self.read_until_prompt(timeout).await?;

        if self.privilege_manager.current() != Some(next) {
            return Err(failed().into());
        }
        Ok(())
    }

    /// Send a sequence of inputs, each waiting for its own pattern.
    pub async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> Result<InteractiveResult> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(events.len());

        for event in events {
            let timeout = event.timeout.unwrap_or(self.timeout);

            if event.hidden {
                debug!("{}: interactive input <hidden>", self.host());
            }
            let channel = self.channel_mut()?;
            channel.send(&event.input).await?;
            let data = channel.read_until(&event.pattern, timeout).await?;

            let (raw_output, prompt) = self.split_prompt(&data);
            if !prompt.is_empty() {
                let _ = self.privilege_manager.update_from_prompt(&prompt);
            }

            let output = self.clean_output(&raw_output, &event.input);
            let failure_message = self.detect_failure(&output);

            steps.push(InteractiveStep {
                input: if event.hidden {
                    "<hidden>".to_string()
                } else {
                    event.input.clone()
                },
                output,
                raw_output,
                prompt,
                failure_message,
            });
        }

        Ok(InteractiveResult::new(steps, start.elapsed()))
    }

    /// Send the finalize command, answering its confirmation question if asked.
    async fn send_confirmed(&mut self, step: &FinalizeStep, question: &str, answer: &str) -> Result<Response> {
        let start = Instant::now();

        let question = Regex::new(question).map_err(ChannelError::from)?;
        let either = combine_patterns([&question, &self.prompt_pattern]).map_err(ChannelError::from)?;

        let mut result = self
            .send_interactive(&[InteractiveEvent::with_pattern(step.command.clone(), either)])
            .await?;

        let asked = result.steps.last().is_some_and(|s| s.prompt.is_empty());
        if asked {
            let reply = InteractiveEvent::with_pattern(answer, self.prompt_pattern.clone());
            let more = self.send_interactive(&[reply]).await?;
            result.steps.extend(more.steps);
        }

        let result = InteractiveResult::new(result.steps, start.elapsed());
        let raw = result
            .steps
            .iter()
            .map(|s| s.raw_output.as_str())
            .collect::<String>();
        let prompt = result
            .steps
            .last()
            .map(|s| s.prompt.clone())
            .unwrap_or_default();

        let response = Response::new(&step.command, result.full_output(), raw, prompt, result.elapsed);
        Ok(match result.failure_message() {
            Some(message) => response.with_failure(message),
            None => response,
        })
    }
}

impl CliSession for GenericDriver {
    fn dialect(&self) -> &str {
        &self.platform.name
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();

        self.channel_mut()?.send(command).await?;
        let (raw_result, prompt) = self.read_until_prompt(self.timeout).await?;

        let result = self.clean_output(&raw_result, command);
        let response = Response::new(command, result, raw_result, prompt, start.elapsed());

        Ok(match self.detect_failure(&response.result) {
            Some(message) => response.with_failure(message),
            None => response,
        })
    }

    async fn enter_config_mode(&mut self) -> Result<()> {
        let config = self
            .platform
            .config_privilege
            .clone()
            .ok_or_else(|| DriverError::NoConfigMode {
                platform: self.platform.name.clone(),
            })?;

        self.acquire_privilege(&config).await
    }

    fn finalize_action(&self) -> Option<FinalizeAction> {
        self.platform.finalize.as_ref().map(|s| s.action)
    }

    async fn finalize(&mut self) -> Result<Response> {
        let step = self
            .platform
            .finalize
            .clone()
            .ok_or_else(|| DriverError::NoFinalizeAction {
                platform: self.platform.name.clone(),
            })?;

        self.acquire_privilege(&step.privilege).await?;

        info!("{}: {} with '{}'", self.host(), step.action, step.command);

        let response = match step.confirm {
            Some(ref confirm) => {
                self.send_confirmed(&step, &confirm.pattern, &confirm.answer)
                    .await?
            }
            None => self.send_command(&step.command).await?,
        };

        if response.is_success() {
            let default = self.platform.default_privilege.clone();
            if let Err(e) = self.acquire_privilege(&default).await {
                warn!(
                    "{}: {} succeeded but returning to {} failed: {}",
                    self.host(),
                    step.action,
                    default,
                    e
                );
            }
        }

        Ok(response)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            self.privilege_manager.reset();
            channel.close().await?;
            info!("{}: session closed", self.host());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.channel.is_some()
    }
}
