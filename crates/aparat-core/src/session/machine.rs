//! Table-driven session state machine.
//!
//! `transition` is pure: it never performs I/O. Side effects are returned as
//! [`Effect`]s for the controller to carry out, so the single-flight and
//! allowance invariants can be checked on the function alone.

use super::event::{Effect, Notice, SessionEvent};
use super::model::{Screen, Session};

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn unchanged(session: &Session, notice: Notice) -> Self {
        Self::to(session.clone()).with(Effect::Notify(notice))
    }

    fn ignored(session: &Session, event: &SessionEvent) -> Self {
        Self::unchanged(
            session,
            Notice::Ignored {
                event: event.kind().to_string(),
            },
        )
    }

    /// Whether the controller must ingest and call the gateway.
    pub fn dispatches(&self) -> bool {
        self.effects.contains(&Effect::Dispatch)
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Notify(notice) => Some(notice),
            _ => None,
        })
    }
}

/// Applies `event` to `session`.
///
/// | from            | event                   | to                       |
/// |-----------------|-------------------------|--------------------------|
/// | Landing         | Start / Navigate        | Hub                      |
/// | Hub             | SubmitAsset (allowed)   | Hub, generating          |
/// | Hub, generating | GenerationSucceeded     | Result, credit consumed  |
/// | Hub, generating | Generation/IngestFailed | Hub                      |
/// | any, idle       | Reset                   | Landing, credit restored |
/// | Result          | ReturnToHub             | Hub                      |
/// | any             | Open/CloseDetail        | same screen              |
pub fn transition(session: &Session, event: SessionEvent) -> Transition {
    match event {
        SessionEvent::OpenDetail { module } => Transition::to(Session {
            active_detail: Some(module),
            ..session.clone()
        }),

        SessionEvent::CloseDetail => Transition::to(Session {
            active_detail: None,
            ..session.clone()
        }),

        SessionEvent::Start if session.screen == Screen::Landing => Transition::to(Session {
            screen: Screen::Hub,
            ..session.clone()
        }),

        SessionEvent::Navigate => {
            let screen = match session.screen {
                Screen::Landing => Screen::Hub,
                other => other,
            };
            Transition::to(Session {
                screen,
                ..session.clone()
            })
        }

        SessionEvent::SubmitAsset => {
            if session.is_generating {
                Transition::unchanged(session, Notice::Busy)
            } else if session.screen != Screen::Hub {
                Transition::ignored(session, &event)
            } else if !session.has_allowance() {
                Transition::unchanged(session, Notice::Exhausted)
            } else {
                Transition::to(Session {
                    is_generating: true,
                    ..session.clone()
                })
                .with(Effect::Dispatch)
            }
        }

        SessionEvent::GenerationSucceeded { result } if session.is_generating => {
            Transition::to(Session {
                screen: Screen::Result,
                is_generating: false,
                result: Some(result),
                credits: 0,
                ..session.clone()
            })
            .with(Effect::ConsumeCredit)
        }

        SessionEvent::GenerationFailed { reason } if session.is_generating => {
            Transition::to(Session {
                is_generating: false,
                ..session.clone()
            })
            .with(Effect::Notify(Notice::GenerationFailed { reason }))
        }

        SessionEvent::IngestFailed { reason } if session.is_generating => {
            Transition::to(Session {
                is_generating: false,
                ..session.clone()
            })
            .with(Effect::Notify(Notice::ReadFailed { reason }))
        }

        SessionEvent::Reset => {
            if session.is_generating {
                Transition::unchanged(session, Notice::Busy)
            } else {
                Transition::to(Session::new(1)).with(Effect::ResetCredit)
            }
        }

        SessionEvent::ReturnToHub if session.screen == Screen::Result => {
            Transition::to(Session {
                screen: Screen::Hub,
                result: None,
                ..session.clone()
            })
        }

        other => Transition::ignored(session, &other),
    }
}
