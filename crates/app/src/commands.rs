use std::io::{BufRead, Write};

use services::{AppServices, GenerationAmount, SessionError};
use study_core::{
    StudyEvent,
    analytics::SubjectProgress,
    model::{
        FlashcardDraft, NewSubject, QuizQuestion, QuizSets, QuizType, ReviewButton,
        SubjectDifficulty, SubjectId,
    },
};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn status(app: &AppServices, out: &mut impl Write) -> CmdResult {
    let study = app.study();
    let state = study.state();
    let now = study.now();

    if state.subjects.is_empty() {
        writeln!(out, "No subjects yet. Run `app seed` to add a demo subject.")?;
        return Ok(());
    }

    if let Some(profile) = &state.profile {
        writeln!(out, "Student: {}", profile.full_name())?;
    }
    for subject in &state.subjects {
        let progress = SubjectProgress::of(subject);
        write!(
            out,
            "{}  {:<24} readiness {:>3}%  due {:>3}  quizzes {:>2} (avg {}%)",
            subject.id,
            subject.name,
            subject.readiness_score.value(),
            subject.due_count(now),
            progress.quizzes_taken,
            progress.average_quiz_score,
        )?;
        match subject.days_until_exam(now) {
            Some(days) if days >= 0 => writeln!(out, "  exam in {days} days")?,
            Some(_) => writeln!(out, "  exam passed")?,
            None => writeln!(out)?,
        }
    }

    let stats = study.profile_stats();
    writeln!(out)?;
    writeln!(out, "Streak: {} day(s)", stats.streak_days)?;
    writeln!(out, "Cards reviewed: {}", stats.cards_reviewed)?;
    if let Some(avg) = stats.average_quiz_score {
        writeln!(out, "Average quiz score: {avg:.0}%")?;
    }
    let name_of = |id: SubjectId| state.subject(id).map_or("?", |s| s.name.as_str());
    if let Some(id) = stats.most_studied {
        writeln!(out, "Most studied: {}", name_of(id))?;
    }
    if let Some(id) = stats.weakest {
        writeln!(out, "Needs work: {}", name_of(id))?;
    }
    Ok(())
}

fn parse_button(line: &str) -> Option<ReviewButton> {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "again" => Some(ReviewButton::Again),
        "g" | "good" => Some(ReviewButton::Good),
        "e" | "easy" => Some(ReviewButton::Easy),
        _ => None,
    }
}

/// Review due cards, reading one of `a`/`g`/`e` per card (`q` stops early).
pub async fn review(
    app: &mut AppServices,
    subject: SubjectId,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CmdResult {
    let study = app.study_mut();
    let mut session = match study.start_flashcard_session(subject) {
        Ok(session) => session,
        Err(SessionError::Empty) => {
            writeln!(out, "Nothing due. Come back tomorrow.")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut line = String::new();
    while let (Some(card), Some(previews)) = (session.current_card(), session.previews()) {
        let progress = session.progress();
        writeln!(out, "[{}/{}] {}", progress.answered + 1, progress.total, card.term)?;
        writeln!(out, "      {}", card.definition)?;
        writeln!(
            out,
            "  (a)gain {}  (g)ood {}  (e)asy {}  (q)uit",
            previews.label(ReviewButton::Again),
            previews.label(ReviewButton::Good),
            previews.label(ReviewButton::Easy),
        )?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 || line.trim().eq_ignore_ascii_case("q") {
            writeln!(out, "Stopped; {} card(s) reviewed.", session.answers().len())?;
            return Ok(());
        }
        let Some(button) = parse_button(&line) else {
            writeln!(out, "Please answer a, g or e.")?;
            continue;
        };
        study.answer_flashcard(&mut session, button).await?;
    }

    writeln!(out, "Session complete: {} card(s) reviewed.", session.total_cards())?;
    Ok(())
}

/// Take a quiz from stdin. Multiple choice takes comma-separated options.
pub async fn quiz(
    app: &mut AppServices,
    subject: SubjectId,
    quiz_type: QuizType,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CmdResult {
    let study = app.study_mut();
    let mut session = match study.start_quiz(subject, quiz_type) {
        Ok(session) => session,
        Err(SessionError::Empty) => {
            writeln!(out, "No {} questions for this subject.", quiz_type.as_str())?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut line = String::new();
    loop {
        let Some(question) = session.current_question() else {
            break;
        };
        writeln!(out, "Q{}: {}", session.position() + 1, question.question)?;
        for option in &question.options {
            writeln!(out, "   - {option}")?;
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim();
        if quiz_type == QuizType::MultipleChoice {
            for choice in answer.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                session.select(choice)?;
            }
        } else if !answer.is_empty() {
            session.select(answer)?;
        }

        match session.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(SessionError::Unanswered) => writeln!(out, "Please enter an answer.")?,
            Err(err) => return Err(err.into()),
        }
    }

    let result = study.finish_quiz(&mut session).await?;
    writeln!(out, "Score: {}% ({}/{})", result.score, result.correct, result.total)?;
    for wrong in &result.incorrect {
        writeln!(
            out,
            "  Q{}: expected {}, you said {}",
            wrong.index + 1,
            wrong.question.correct_answer.join(", "),
            if wrong.given.is_empty() {
                "nothing".to_string()
            } else {
                wrong.given.join(", ")
            }
        )?;
    }
    Ok(())
}

pub async fn generate(
    app: &mut AppServices,
    subject: SubjectId,
    amount: GenerationAmount,
    focus: &str,
    out: &mut impl Write,
) -> CmdResult {
    if !app.generation_enabled() {
        writeln!(out, "Content generation is off; set STUDY_AI_API_KEY to enable it.")?;
        return Ok(());
    }
    let (content, study) = app.content_and_study();
    content.summarize(study, subject).await?;
    let cards = content.flashcards(study, subject, amount, focus).await?;
    content.quizzes(study, subject, amount, focus).await?;
    writeln!(out, "Generated a summary, {cards} flashcard(s) and quizzes.")?;
    Ok(())
}

/// Add a demo subject with material, cards and a short quiz.
pub async fn seed(app: &mut AppServices, out: &mut impl Write) -> CmdResult {
    let study = app.study_mut();
    study
        .dispatch(StudyEvent::AddSubject(NewSubject::new(
            "Cell Biology",
            SubjectDifficulty::Medium,
        )))
        .await?;
    let subject = study
        .state()
        .subjects
        .last()
        .map(|s| s.id)
        .ok_or("seeded subject missing")?;

    study
        .dispatch(StudyEvent::UpdateMaterial {
            subject,
            material: "Cells are the basic unit of life. Mitochondria produce ATP; \
                       the nucleus stores DNA; ribosomes build proteins."
                .into(),
        })
        .await?;
    study
        .dispatch(StudyEvent::SetFlashcards {
            subject,
            cards: vec![
                FlashcardDraft::new("Mitochondria", "Organelle that produces ATP"),
                FlashcardDraft::new("Nucleus", "Stores the cell's DNA"),
                FlashcardDraft::new("Ribosome", "Builds proteins from amino acids"),
                FlashcardDraft::new("ATP", "The cell's energy currency"),
            ],
        })
        .await?;

    let mut quizzes = QuizSets::new();
    quizzes.insert(
        QuizType::TrueFalse,
        vec![
            demo_question("Ribosomes store DNA.", &["True", "False"], &["False"]),
            demo_question("Mitochondria produce ATP.", &["True", "False"], &["True"]),
        ],
    );
    quizzes.insert(
        QuizType::MultipleChoice,
        vec![demo_question(
            "Which are organelles?",
            &["Nucleus", "Ribosome", "Glucose", "Mitochondria"],
            &["Nucleus", "Ribosome", "Mitochondria"],
        )],
    );
    quizzes.insert(
        QuizType::FillInTheBlank,
        vec![demo_question("The ___ stores DNA.", &[], &["nucleus"])],
    );
    study
        .dispatch(StudyEvent::SetQuizzes { subject, quizzes })
        .await?;

    writeln!(out, "Seeded subject {subject} (Cell Biology).")?;
    Ok(())
}

fn demo_question(question: &str, options: &[&str], correct: &[&str]) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        options: options.iter().map(|s| (*s).to_string()).collect(),
        correct_answer: correct.iter().map(|s| (*s).to_string()).collect(),
        explanation: String::new(),
    }
}

pub async fn reset(app: &mut AppServices, out: &mut impl Write) -> CmdResult {
    app.study_mut().dispatch(StudyEvent::Reset).await?;
    writeln!(out, "All study data cleared.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;
    use services::{Clock, ContentGenerator, HttpContentGenerator};
    use storage::repository::Storage;
    use study_core::time::fixed_now;

    async fn app() -> AppServices {
        let generator: Arc<dyn ContentGenerator> = Arc::new(HttpContentGenerator::new(None));
        AppServices::with_storage(
            Storage::in_memory(),
            "cli",
            Clock::fixed(fixed_now()),
            generator,
            false,
        )
        .await
        .unwrap()
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn seed_then_status_lists_subject() {
        let mut app = app().await;
        let mut out = Vec::new();
        seed(&mut app, &mut out).await.unwrap();

        let mut out = Vec::new();
        status(&app, &mut out).unwrap();
        let printed = text(out);
        assert!(printed.contains("Cell Biology"));
        assert!(printed.contains("readiness  55%"));
        assert!(printed.contains("due   4"));
    }

    #[tokio::test]
    async fn review_reads_answers_until_done() {
        let mut app = app().await;
        seed(&mut app, &mut Vec::new()).await.unwrap();
        let subject = app.study().state().subjects[0].id;

        let mut input = Cursor::new("g\nx\ne\na\ng\n");
        let mut out = Vec::new();
        review(&mut app, subject, &mut input, &mut out).await.unwrap();

        let printed = text(out);
        assert!(printed.contains("Please answer a, g or e."));
        assert!(printed.contains("Session complete: 4 card(s) reviewed."));
        assert_eq!(app.study().due_cards(subject).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn quiz_reports_score_and_mistakes() {
        let mut app = app().await;
        seed(&mut app, &mut Vec::new()).await.unwrap();
        let subject = app.study().state().subjects[0].id;

        let mut input = Cursor::new("false\nfalse\n");
        let mut out = Vec::new();
        quiz(&mut app, subject, QuizType::TrueFalse, &mut input, &mut out)
            .await
            .unwrap();

        let printed = text(out);
        assert!(printed.contains("Score: 50% (1/2)"));
        assert!(printed.contains("Q2: expected True, you said false"));
    }

    #[tokio::test]
    async fn generate_without_key_is_a_notice() {
        let mut app = app().await;
        let mut out = Vec::new();
        generate(&mut app, SubjectId::generate(), GenerationAmount::Few, "", &mut out)
            .await
            .unwrap();
        assert!(text(out).contains("STUDY_AI_API_KEY"));
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut app = app().await;
        seed(&mut app, &mut Vec::new()).await.unwrap();
        reset(&mut app, &mut Vec::new()).await.unwrap();

        let mut out = Vec::new();
        status(&app, &mut out).unwrap();
        assert!(text(out).contains("No subjects yet"));
    }
}
