use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use marmalade::{
    AchievementKind, Clock, EconomyError, Origin, Session, SnapshotStore, StoreError,
    UpgradeKind, view::Dashboard,
};

const MAX_MESSAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Mining,
    Factories,
    Daily,
    Achievements,
}

impl PaneFocus {
    fn next(self) -> Self {
        match self {
            PaneFocus::Mining => PaneFocus::Factories,
            PaneFocus::Factories => PaneFocus::Daily,
            PaneFocus::Daily => PaneFocus::Achievements,
            PaneFocus::Achievements => PaneFocus::Mining,
        }
    }

    fn prev(self) -> Self {
        match self {
            PaneFocus::Mining => PaneFocus::Achievements,
            PaneFocus::Factories => PaneFocus::Mining,
            PaneFocus::Daily => PaneFocus::Factories,
            PaneFocus::Achievements => PaneFocus::Daily,
        }
    }
}

pub struct App<S, C> {
    pub focus: PaneFocus,
    pub should_quit: bool,
    pub selected_upgrade: usize,
    pub messages: VecDeque<String>,
    announced: Vec<AchievementKind>,
    session: Session<S, C>,
}

impl<S: SnapshotStore, C: Clock> App<S, C> {
    pub fn new(session: Session<S, C>) -> Self {
        // Unlocks from the offline catch-up are announced below, not seeded.
        let offline_unlock = session.caught_up().first_collect_unlocked;
        let announced = AchievementKind::ALL
            .into_iter()
            .filter(|kind| session.model().achievements().is_achieved(*kind))
            .filter(|kind| !(offline_unlock && *kind == AchievementKind::FirstCollect))
            .collect();
        let mut app = Self {
            focus: PaneFocus::Mining,
            should_quit: false,
            selected_upgrade: 0,
            messages: VecDeque::new(),
            announced,
            session,
        };
        match app.session.origin() {
            Origin::Fresh => app.push_message("Welcome to the marmalade mine!"),
            Origin::Restored => app.push_message("Welcome back. Your mine kept working."),
            Origin::Recovered => app.push_message("Save was unreadable; started a new mine."),
        }
        if app.session.caught_up().completed {
            app.push_message("Marmalade is ready to collect!");
        }
        app.announce_new_achievements();
        app
    }

    pub fn dashboard(&self) -> Dashboard {
        self.session.dashboard()
    }

    pub fn on_tick(&mut self) {
        let outcome = self.session.tick();
        if outcome.completed {
            self.push_message("Marmalade is ready to collect!");
        }
        if outcome.first_collect_unlocked {
            self.announce_new_achievements();
        }
    }

    /// Final save before the shell exits.
    pub fn shutdown(&mut self) -> Result<(), StoreError> {
        self.session.flush()
    }

    fn push_message(&mut self, msg: impl Into<String>) {
        self.messages.push_front(msg.into());
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_back();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q' | 'Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
            }
            KeyCode::Char('c') => self.collect(),
            KeyCode::Char('d') => self.claim_daily(),
            _ => match self.focus {
                PaneFocus::Mining => self.handle_mining_input(key),
                PaneFocus::Factories => self.handle_factories_input(key),
                PaneFocus::Daily => self.handle_daily_input(key),
                PaneFocus::Achievements => {}
            },
        }
    }

    fn handle_mining_input(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.collect();
        }
    }

    fn handle_factories_input(&mut self, key: KeyEvent) {
        let len = UpgradeKind::ALL.len();
        match key.code {
            KeyCode::Up => {
                self.selected_upgrade = (self.selected_upgrade + len - 1) % len;
            }
            KeyCode::Down => {
                self.selected_upgrade = (self.selected_upgrade + 1) % len;
            }
            KeyCode::Enter => self.buy_selected(),
            _ => {}
        }
    }

    fn handle_daily_input(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.claim_daily();
        }
    }

    fn collect(&mut self) {
        match self.session.collect() {
            Ok(collection) => {
                self.push_message(format!("Collected {} MARM!", collection.earned));
                self.announce_new_achievements();
            }
            Err(EconomyError::NotReady { progress }) => {
                self.push_message(format!("Still mining: {:.0}% done", progress.floor()));
            }
            Err(e) => self.push_message(e.to_string()),
        }
    }

    fn buy_selected(&mut self) {
        let kind = UpgradeKind::ALL[self.selected_upgrade % UpgradeKind::ALL.len()];
        match self.session.buy(kind) {
            Ok(purchase) => {
                self.push_message(format!(
                    "Purchased {} #{} for {:.0} MARM",
                    kind.label(),
                    purchase.count,
                    purchase.paid
                ));
                self.announce_new_achievements();
            }
            Err(EconomyError::InsufficientFunds { cost, .. }) => {
                self.push_message(format!("Not enough MARM! {} costs {:.0}", kind.label(), cost));
            }
            Err(e) => self.push_message(e.to_string()),
        }
    }

    fn claim_daily(&mut self) {
        match self.session.claim_daily() {
            Ok(claim) => {
                self.push_message(format!(
                    "Daily bonus: +{} MARM! Streak: {} days",
                    claim.granted, claim.streak
                ));
                self.announce_new_achievements();
            }
            Err(EconomyError::AlreadyClaimed { .. }) => {
                self.push_message("Already claimed today!");
            }
            Err(e) => self.push_message(e.to_string()),
        }
    }

    fn announce_new_achievements(&mut self) {
        for kind in AchievementKind::ALL {
            if self.announced.contains(&kind)
                || !self.session.model().achievements().is_achieved(kind)
            {
                continue;
            }
            self.announced.push(kind);
            self.push_message(format!("Achievement unlocked: {}", kind.label()));
        }
    }
}
