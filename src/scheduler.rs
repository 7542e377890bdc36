//! Buffer lifecycle and refresh scheduling
//!
//! Every host callback arrives as an [`Event`] at [`Scheduler::handle`],
//! which runs to completion before returning. The only deferred work is a
//! debounced refresh: the scheduler hands back [`Cmd::ScheduleRefresh`]
//! and the host feeds `Event::RefreshDue` back when the timer fires. A
//! newer trigger supersedes the pending one, so at most one refresh per
//! buffer is ever waiting.
//!
//! ```text
//! Edited ─▶ enabled? ─▶ debounce? ─yes─▶ Cmd::ScheduleRefresh ─▶ (timer) ─▶ RefreshDue
//!                           │                                              │
//!                           no                                   latest generation?
//!                           ▼                                              ▼
//!                        refresh ◀─────────────────────────────────────────┘
//!                           │
//!          clear ─▶ locate ─▶ admit ─▶ place
//! ```

use crate::commands::{CommandId, CommandOutcome};
use crate::config::PluginConfig;
use crate::error::DefmarkError;
use crate::event::{Cmd, Event, RefreshEvent};
use crate::host::{BufferId, Host, NotifyLevel};
use crate::locator::Locator;
use crate::overlay::{OverlayManager, RefreshReport};
use crate::state::{BufferState, StateStore};
use crate::syntax::{LanguageId, ParserState, SyntaxProvider};

/// Owns all per-buffer state and drives the marker pipeline
pub struct Scheduler<P = ParserState> {
    config: PluginConfig,
    store: StateStore,
    locator: Locator,
    provider: P,
    overlays: OverlayManager,
}

impl Scheduler<ParserState> {
    /// Scheduler for Python buffers with the bundled tree-sitter parser
    pub fn new(config: PluginConfig) -> Result<Self, DefmarkError> {
        Ok(Self::with_parts(
            config,
            Locator::python()?,
            ParserState::new(),
            OverlayManager::default(),
        ))
    }
}

impl<P: SyntaxProvider> Scheduler<P> {
    pub fn with_parts(
        config: PluginConfig,
        locator: Locator,
        provider: P,
        overlays: OverlayManager,
    ) -> Self {
        Self {
            config,
            store: StateStore::new(),
            locator,
            provider,
            overlays,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PluginConfig {
        &mut self.config
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    /// The only language markers are placed for
    pub fn target_language(&self) -> LanguageId {
        self.locator.language()
    }

    /// Current state of a buffer (for diagnostics and status lines)
    pub fn status(&self, buffer: BufferId) -> BufferState {
        self.store.state(buffer)
    }

    pub fn enabled_buffers(&self) -> Vec<BufferId> {
        self.store.enabled_buffers()
    }

    /// Number of buffers with tracked state
    pub fn tracked_buffers(&self) -> usize {
        self.store.len()
    }

    // ========================================================================
    // Event dispatch
    // ========================================================================

    /// Single entry point for host events
    pub fn handle<H>(&mut self, host: &mut H, event: Event) -> Option<Cmd>
    where
        H: Host + ?Sized,
    {
        tracing::trace!("handle: {:?}", event);

        match event {
            Event::BufferEntered(buffer) | Event::FileTypeDetected(buffer) => {
                if self.store.state(buffer).is_enabled() {
                    // File type may have changed; refresh re-checks the language
                    self.refresh(host, buffer);
                } else {
                    self.try_auto_enable(host, buffer);
                }
                None
            }

            Event::Edited(trigger, buffer) => self.on_edit(host, trigger, buffer),

            Event::RefreshDue { buffer, generation } => {
                if self.store.take_due(buffer, generation) {
                    self.refresh(host, buffer);
                } else {
                    tracing::debug!(
                        "Dropping superseded refresh for buffer {} (generation {})",
                        buffer,
                        generation
                    );
                }
                None
            }

            Event::BufferClosed(buffer) => {
                self.store.remove(buffer);
                self.provider.forget(buffer);
                tracing::debug!("Dropped state for closed buffer {}", buffer);
                None
            }

            Event::Command(command, buffer) => {
                self.run_command(host, buffer, command);
                None
            }
        }
    }

    fn try_auto_enable<H>(&mut self, host: &mut H, buffer: BufferId)
    where
        H: Host + ?Sized,
    {
        if !self.config.auto_enable {
            return;
        }
        if self
            .store
            .get(buffer)
            .is_some_and(|entry| entry.auto_enable_attempted)
        {
            return;
        }
        if !host.is_valid(buffer) || host.language(buffer) != self.target_language() {
            return;
        }

        self.store.entry_mut(buffer).auto_enable_attempted = true;
        if let Err(e) = self.enable(host, buffer) {
            tracing::debug!("Auto-enable skipped for buffer {}: {}", buffer, e);
        }
    }

    fn on_edit<H>(&mut self, host: &mut H, trigger: RefreshEvent, buffer: BufferId) -> Option<Cmd>
    where
        H: Host + ?Sized,
    {
        if !self.config.wants(trigger) || !self.store.state(buffer).is_enabled() {
            return None;
        }

        let delay = self.config.debounce();
        if delay.is_zero() {
            self.refresh(host, buffer);
            return None;
        }

        let generation = self.store.schedule(buffer);
        tracing::trace!(
            "Debouncing refresh of buffer {} after {} (generation {})",
            buffer,
            trigger,
            generation
        );
        Some(Cmd::ScheduleRefresh {
            buffer,
            generation,
            delay,
        })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Disabled → Enabled, followed by an immediate full refresh
    ///
    /// Refused (state unchanged) if the buffer is gone or is not in the
    /// target language.
    pub fn enable<H>(&mut self, host: &mut H, buffer: BufferId) -> Result<RefreshReport, DefmarkError>
    where
        H: Host + ?Sized,
    {
        if !host.is_valid(buffer) {
            return Err(DefmarkError::InvalidBuffer(buffer));
        }

        let detected = host.language(buffer);
        let target = self.target_language();
        if detected != target {
            if self.store.state(buffer).is_enabled() {
                // Language changed without a file-type event
                self.disable(host, buffer);
            }
            return Err(DefmarkError::LanguageMismatch { detected, target });
        }

        self.store.set_state(buffer, BufferState::Enabled);
        tracing::info!("Enabled definition markers for buffer {}", buffer);
        Ok(self.refresh_markers(host, buffer))
    }

    /// Clear all markers and mark the buffer Disabled
    ///
    /// Returns whether any markers were showing.
    pub fn disable<H>(&mut self, host: &mut H, buffer: BufferId) -> bool
    where
        H: Host + ?Sized,
    {
        if !host.is_valid(buffer) {
            self.store.remove(buffer);
            return false;
        }

        let had_markers = self.overlays.clear(host, buffer) > 0;

        if let Some(entry) = self.store.get_mut(buffer) {
            entry.state = BufferState::Disabled;
            entry.pending = None;
        }

        tracing::info!(
            "Disabled definition markers for buffer {} (had markers: {})",
            buffer,
            had_markers
        );
        had_markers
    }

    /// Hide markers if any are showing, otherwise enable
    pub fn toggle<H>(&mut self, host: &mut H, buffer: BufferId) -> Result<CommandOutcome, DefmarkError>
    where
        H: Host + ?Sized,
    {
        if self.disable(host, buffer) {
            return Ok(CommandOutcome::Disabled { had_markers: true });
        }
        let report = self.enable(host, buffer)?;
        Ok(CommandOutcome::Enabled {
            markers: report.placed,
        })
    }

    /// Recompute markers for an Enabled buffer; no-op otherwise
    pub fn refresh<H>(&mut self, host: &mut H, buffer: BufferId) -> Option<RefreshReport>
    where
        H: Host + ?Sized,
    {
        if !self.store.state(buffer).is_enabled() {
            return None;
        }

        if !host.is_valid(buffer) {
            tracing::debug!("Skipping refresh of invalid buffer {}", buffer);
            self.store.remove(buffer);
            return None;
        }

        let detected = host.language(buffer);
        if detected != self.target_language() {
            tracing::info!(
                "Buffer {} is now {}, disabling markers",
                buffer,
                detected.display_name()
            );
            self.disable(host, buffer);
            return None;
        }

        Some(self.refresh_markers(host, buffer))
    }

    /// clear → locate → admit → place
    fn refresh_markers<H>(&mut self, host: &mut H, buffer: BufferId) -> RefreshReport
    where
        H: Host + ?Sized,
    {
        let sites = match self.locator.locate(&*host, &mut self.provider, buffer) {
            Ok(sites) => sites,
            Err(e @ DefmarkError::ParserUnavailable { .. }) => {
                tracing::warn!("{}", e);
                host.notify(NotifyLevel::Warn, &e.to_string());
                Vec::new()
            }
            Err(e) => {
                tracing::debug!("Locating definitions in buffer {}: {}", buffer, e);
                Vec::new()
            }
        };

        self.overlays.refresh_all(host, buffer, &sites)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run a user command and notify the outcome
    pub fn run_command<H>(&mut self, host: &mut H, buffer: BufferId, command: CommandId) -> CommandOutcome
    where
        H: Host + ?Sized,
    {
        let result = match command {
            CommandId::Enable => self
                .enable(host, buffer)
                .map(|report| CommandOutcome::Enabled {
                    markers: report.placed,
                }),
            CommandId::Disable => Ok(CommandOutcome::Disabled {
                had_markers: self.disable(host, buffer),
            }),
            CommandId::Toggle => self.toggle(host, buffer),
        };

        match result {
            Ok(outcome) => {
                host.notify(NotifyLevel::Info, &outcome.describe());
                outcome
            }
            Err(e) => {
                tracing::warn!("{} failed for buffer {}: {}", command, buffer, e);
                host.notify(NotifyLevel::Warn, &format!("{}: {}", command, e));
                CommandOutcome::Refused
            }
        }
    }
}
