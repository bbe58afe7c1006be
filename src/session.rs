//! Quiz session state machine.
//!
//! Every change to a session goes through [`SessionState::apply`], which takes
//! the current state and one [`Event`] and returns the next state together with
//! the [`Effect`]s the caller has to carry out (pause the player, show a toast,
//! arm a timer...). Nothing in here touches a player or a clock, so a whole
//! session can be replayed from a list of events.

use std::{collections::BTreeSet, time::Duration};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    notification::Notification,
    question::{QuestionId, Quiz},
};

/// What happens to questions that were never answered when playback ends
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    /// The results are shown as soon as playback ends; unanswered questions count as missed
    #[default]
    ForfeitSkipped,
    /// Unanswered questions are asked one by one after playback ends, then the results are shown
    RequireAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The player can take commands; polling may begin
    PlayerReady,
    /// A poll sampled the playback position
    Tick { position: Duration },
    PlayerEnded,
    /// The learner picked a choice for the active question
    Submit { choice: usize },
    /// The feedback delay for `question` ran out
    FeedbackElapsed { question: QuestionId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartPolling,
    StopPolling,
    Pause,
    Resume,
    Notify(Notification),
    /// Feed back [`Event::FeedbackElapsed`] for `question` after the feedback delay
    ScheduleFeedback { question: QuestionId },
    ShowResults,
}

/// Output of [`SessionState::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

/// Where a question stands, used to colour its timeline marker
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerStatus {
    Pending,
    Active,
    Completed,
}

/// Final score shown when the session finishes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Summary {
    pub correct: usize,
    pub total: usize,
}

impl Summary {
    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }

    pub fn headline(&self) -> String {
        format!(
            "Has acertado {} de {} preguntas.",
            self.correct, self.total
        )
    }

    pub fn message(&self) -> &'static str {
        if self.is_perfect() {
            "¡Perfecto! ¡Has demostrado ser un experto en el comportamiento de los leones!"
        } else {
            "¡Buen intento! Puedes volver a ver el video para mejorar tu puntuación."
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    policy: CompletionPolicy,
    current_time: f64,
    answered: BTreeSet<QuestionId>,
    active: Option<QuestionId>,
    selected: Option<usize>,
    correct_count: usize,
    finished: bool,
    playback_ended: bool,
    polling: bool,
}

impl SessionState {
    pub fn new(policy: CompletionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Last polled playback position, in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn answered(&self) -> &BTreeSet<QuestionId> {
        &self.answered
    }

    pub fn active(&self) -> Option<QuestionId> {
        self.active
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn playback_ended(&self) -> bool {
        self.playback_ended
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn summary(&self, quiz: &Quiz) -> Option<Summary> {
        self.finished.then(|| Summary {
            correct: self.correct_count,
            total: quiz.len(),
        })
    }

    pub fn marker_status(&self, id: QuestionId) -> MarkerStatus {
        if self.answered.contains(&id) {
            MarkerStatus::Completed
        } else if self.active == Some(id) {
            MarkerStatus::Active
        } else {
            MarkerStatus::Pending
        }
    }

    /// Runs one event through the session
    pub fn apply(mut self, quiz: &Quiz, event: Event) -> Transition {
        let mut effects = vec![];
        match event {
            Event::PlayerReady => {
                if !self.polling && !self.playback_ended {
                    self.polling = true;
                    effects.push(Effect::StartPolling);
                }
            }
            Event::Tick { position } => {
                self.current_time = position.as_secs_f64();
                debug!("playback at {:.1}s", self.current_time);
                self.present_next(quiz, &mut effects);
            }
            Event::PlayerEnded => self.end_playback(quiz, &mut effects),
            Event::Submit { choice } => self.submit(quiz, choice, &mut effects),
            Event::FeedbackElapsed { question } => {
                self.answered.insert(question);
                if self.active == Some(question) {
                    self.active = None;
                    self.selected = None;
                    if !self.playback_ended {
                        effects.push(Effect::Resume);
                    }
                }
                self.present_next(quiz, &mut effects);
            }
        }
        Transition {
            state: self,
            effects,
        }
    }

    fn next_question(&self, quiz: &Quiz) -> Option<QuestionId> {
        let asking_leftovers = self.playback_ended && self.policy == CompletionPolicy::RequireAll;
        quiz.questions()
            .iter()
            .find(|question| {
                (asking_leftovers || question.timestamp <= self.current_time)
                    && !self.answered.contains(&question.id)
                    && self.active.map_or(true, |active| question.id > active)
            })
            .map(|question| question.id)
    }

    fn present_next(&mut self, quiz: &Quiz, effects: &mut Vec<Effect>) {
        if self.finished {
            return;
        }
        match self.next_question(quiz) {
            Some(id) if self.active != Some(id) => {
                info!("presenting question {id}");
                self.active = Some(id);
                self.selected = None;
                if !self.playback_ended {
                    effects.push(Effect::Pause);
                }
                effects.push(Effect::Notify(Notification::question_available()));
            }
            Some(_) => {}
            None => {
                if self.playback_ended && self.active.is_none() {
                    self.finish(quiz, effects);
                }
            }
        }
    }

    fn end_playback(&mut self, quiz: &Quiz, effects: &mut Vec<Effect>) {
        if self.playback_ended {
            return;
        }
        self.playback_ended = true;
        if self.polling {
            self.polling = false;
            effects.push(Effect::StopPolling);
        }
        match self.policy {
            CompletionPolicy::ForfeitSkipped => self.finish(quiz, effects),
            CompletionPolicy::RequireAll => {
                if self.active.is_none() {
                    self.present_next(quiz, effects);
                }
            }
        }
    }

    fn submit(&mut self, quiz: &Quiz, choice: usize, effects: &mut Vec<Effect>) {
        if self.finished {
            return;
        }
        let Some(question) = self.active.and_then(|id| quiz.get(id)) else {
            return;
        };
        if self.selected.is_some() || choice >= question.choices.len() {
            return;
        }

        self.selected = Some(choice);
        if question.is_correct(choice) {
            self.correct_count += 1;
            info!("question {} answered correctly", question.id);
            effects.push(Effect::Notify(Notification::correct_answer()));
        } else {
            info!("question {} answered incorrectly", question.id);
            effects.push(Effect::Notify(Notification::wrong_answer()));
        }
        effects.push(Effect::ScheduleFeedback {
            question: question.id,
        });
    }

    fn finish(&mut self, quiz: &Quiz, effects: &mut Vec<Effect>) {
        if self.finished {
            return;
        }
        self.finished = true;
        info!(
            "quiz finished with {} of {} correct",
            self.correct_count,
            quiz.len()
        );
        effects.push(Effect::ShowResults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notification::NotificationStyle, question::Question};

    fn tick(secs: u64) -> Event {
        Event::Tick {
            position: Duration::from_secs(secs),
        }
    }

    fn run(state: SessionState, quiz: &Quiz, event: Event) -> (SessionState, Vec<Effect>) {
        let Transition { state, effects } = state.apply(quiz, event);
        (state, effects)
    }

    #[test]
    fn ready_starts_polling_once() {
        let quiz = Quiz::default();
        let (state, effects) = run(SessionState::default(), &quiz, Event::PlayerReady);
        assert_eq!(effects, vec![Effect::StartPolling]);
        assert!(state.is_polling());

        let (_, effects) = run(state, &quiz, Event::PlayerReady);
        assert!(effects.is_empty());
    }

    #[test]
    fn reaching_a_timestamp_pauses_and_notifies() {
        let quiz = Quiz::default();
        let (state, effects) = run(SessionState::default(), &quiz, tick(41));
        assert!(effects.is_empty());
        assert_eq!(state.active(), None);

        let (state, effects) = run(state, &quiz, tick(42));
        assert_eq!(state.active(), Some(QuestionId(1)));
        assert_eq!(
            effects,
            vec![
                Effect::Pause,
                Effect::Notify(Notification::question_available())
            ]
        );

        // paused player reports the same position again
        let (state, effects) = run(state, &quiz, tick(42));
        assert!(effects.is_empty());
        assert_eq!(state.active(), Some(QuestionId(1)));
    }

    #[test]
    fn submit_scores_once_and_schedules_feedback() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, effects) = run(state, &quiz, Event::Submit { choice: 1 });
        assert_eq!(state.correct_count(), 1);
        assert_eq!(state.selected(), Some(1));
        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notification::correct_answer()),
                Effect::ScheduleFeedback {
                    question: QuestionId(1)
                }
            ]
        );

        let before = state.clone();
        let (state, effects) = run(state, &quiz, Event::Submit { choice: 0 });
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn wrong_answer_notifies_failure() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, effects) = run(state, &quiz, Event::Submit { choice: 0 });
        assert_eq!(state.correct_count(), 0);
        assert!(matches!(
            &effects[0],
            Effect::Notify(n) if n.style == NotificationStyle::Failure
        ));
    }

    #[test]
    fn submit_without_active_question_or_out_of_range_is_ignored() {
        let quiz = Quiz::default();
        let (state, effects) = run(SessionState::default(), &quiz, Event::Submit { choice: 1 });
        assert!(effects.is_empty());
        assert_eq!(state.selected(), None);

        let (state, _) = run(state, &quiz, tick(45));
        let (state, effects) = run(state, &quiz, Event::Submit { choice: 5 });
        assert!(effects.is_empty());
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn feedback_elapsed_marks_answered_and_resumes() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, _) = run(state, &quiz, Event::Submit { choice: 1 });
        let (state, effects) = run(
            state,
            &quiz,
            Event::FeedbackElapsed {
                question: QuestionId(1),
            },
        );
        assert_eq!(effects, vec![Effect::Resume]);
        assert_eq!(state.active(), None);
        assert_eq!(state.selected(), None);
        assert!(state.answered().contains(&QuestionId(1)));
        assert_eq!(state.marker_status(QuestionId(1)), MarkerStatus::Completed);
        assert_eq!(state.marker_status(QuestionId(2)), MarkerStatus::Pending);
    }

    #[test]
    fn seeking_past_several_timestamps_surfaces_them_in_order() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(200));
        assert_eq!(state.active(), Some(QuestionId(1)));

        let (state, _) = run(state, &quiz, Event::Submit { choice: 1 });
        let (state, effects) = run(
            state,
            &quiz,
            Event::FeedbackElapsed {
                question: QuestionId(1),
            },
        );
        assert_eq!(state.active(), Some(QuestionId(2)));
        assert_eq!(
            effects,
            vec![
                Effect::Resume,
                Effect::Pause,
                Effect::Notify(Notification::question_available())
            ]
        );
    }

    #[test]
    fn later_question_replaces_active_one_when_seeking_forward() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, _) = run(state, &quiz, tick(130));
        assert_eq!(state.active(), Some(QuestionId(2)));
        assert_eq!(state.marker_status(QuestionId(1)), MarkerStatus::Pending);
        assert_eq!(state.marker_status(QuestionId(2)), MarkerStatus::Active);
    }

    #[test]
    fn stale_feedback_does_not_clear_the_new_active_question() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, _) = run(state, &quiz, Event::Submit { choice: 1 });
        let (state, _) = run(state, &quiz, tick(130));
        assert_eq!(state.active(), Some(QuestionId(2)));
        assert_eq!(state.selected(), None);

        let (state, effects) = run(
            state,
            &quiz,
            Event::FeedbackElapsed {
                question: QuestionId(1),
            },
        );
        assert!(effects.is_empty());
        assert!(state.answered().contains(&QuestionId(1)));
        assert_eq!(state.active(), Some(QuestionId(2)));
    }

    #[test]
    fn forfeit_policy_finishes_on_end() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, Event::PlayerReady);
        let (state, effects) = run(state, &quiz, Event::PlayerEnded);
        assert_eq!(effects, vec![Effect::StopPolling, Effect::ShowResults]);
        assert!(state.is_finished());
        assert_eq!(
            state.summary(&quiz),
            Some(Summary {
                correct: 0,
                total: 4
            })
        );

        let (state, effects) = run(state, &quiz, tick(336));
        assert!(effects.is_empty());
        assert_eq!(state.active(), None);
    }

    #[test]
    fn require_all_policy_asks_leftovers_after_end() {
        let quiz = Quiz::default();
        let mut state = SessionState::new(CompletionPolicy::RequireAll);
        state = run(state, &quiz, Event::PlayerEnded).0;
        assert!(!state.is_finished());
        assert_eq!(state.active(), Some(QuestionId(1)));

        for id in 1..=4 {
            assert_eq!(state.active(), Some(QuestionId(id)));
            state = run(state, &quiz, Event::Submit { choice: 1 }).0;
            let (next, effects) = run(
                state,
                &quiz,
                Event::FeedbackElapsed {
                    question: QuestionId(id),
                },
            );
            assert!(!effects.contains(&Effect::Resume));
            state = next;
        }
        assert!(state.is_finished());
        assert_eq!(state.summary(&quiz).map(|s| s.is_perfect()), Some(true));
    }

    #[test]
    fn submit_after_results_is_ignored() {
        let quiz = Quiz::default();
        let (state, _) = run(SessionState::default(), &quiz, tick(45));
        let (state, _) = run(state, &quiz, Event::PlayerEnded);
        assert!(state.is_finished());
        assert_eq!(state.active(), Some(QuestionId(1)));

        let before = state.clone();
        let (state, effects) = run(state, &quiz, Event::Submit { choice: 1 });
        assert!(effects.is_empty());
        assert_eq!(state, before);
        assert_eq!(state.correct_count(), 0);
    }

    #[test]
    fn questions_sharing_a_timestamp_come_up_in_id_order() {
        let quiz = Quiz::new(vec![
            Question::new(1, 10.0, "a", ["x", "y"], 0),
            Question::new(2, 10.0, "b", ["x", "y"], 1),
        ])
        .unwrap();
        let (state, _) = run(SessionState::default(), &quiz, tick(10));
        assert_eq!(state.active(), Some(QuestionId(1)));

        let (state, _) = run(state, &quiz, Event::Submit { choice: 0 });
        let (state, effects) = run(
            state,
            &quiz,
            Event::FeedbackElapsed {
                question: QuestionId(1),
            },
        );
        assert_eq!(state.active(), Some(QuestionId(2)));
        assert_eq!(
            effects,
            vec![
                Effect::Resume,
                Effect::Pause,
                Effect::Notify(Notification::question_available())
            ]
        );

        let (state, _) = run(state, &quiz, Event::Submit { choice: 1 });
        let (state, _) = run(
            state,
            &quiz,
            Event::FeedbackElapsed {
                question: QuestionId(2),
            },
        );
        assert_eq!(state.active(), None);
        assert_eq!(state.correct_count(), 2);
    }

    #[test]
    fn summary_messages() {
        let perfect = Summary {
            correct: 4,
            total: 4,
        };
        assert!(perfect.headline().contains("4 de 4"));
        assert!(perfect.message().starts_with("¡Perfecto!"));

        let partial = Summary {
            correct: 3,
            total: 4,
        };
        assert!(partial.headline().contains("3 de 4"));
        assert!(partial.message().starts_with("¡Buen intento!"));
    }
}
