use aspas::model::entity::{
    Exercise, ExerciseCreateUpdate, ExerciseType, Question, QuestionCreate, UserEntity,
    UserEntityCreateUpdate,
};
use aspas::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use aspas::web::AuthenticatedUser;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the learning DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage exercises
    Exercise {
        #[command(subcommand)]
        action: ExerciseCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: String,
    },
}

/// Exercise management
#[derive(Subcommand, Debug)]
pub enum ExerciseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        exercise_type: String,
        /// Path to a text file with the exercise content
        #[arg(long)]
        file: String,
        #[arg(long)]
        audio_url: Option<String>,
        #[arg(long)]
        language: String,
        #[arg(long)]
        level: String,
    },
    AddQuestion {
        /// Exercise title to attach the question to
        #[arg(long)]
        exercise_title: String,
        #[arg(long)]
        prompt: String,
        /// Repeat for each choice; leave out for dictation
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long)]
        correct_answer: String,
    },
}

#[tokio::main]
async fn main() -> aspas::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").unwrap())?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                email,
                name,
                password,
                role,
            } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email,
                        name,
                        password_hash: aspas::auth::hash_password(&password).unwrap(),
                        role,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Exercise { action } => match action {
            ExerciseCommands::Add {
                title,
                description,
                exercise_type,
                file,
                audio_url,
                language,
                level,
            } => {
                // fail fast on a typo'd type before touching the DB
                let _: ExerciseType = exercise_type.parse().unwrap();

                let content = std::fs::read_to_string(file)?;
                let exercise = Exercise::create(
                    &mm,
                    &actor,
                    ExerciseCreateUpdate {
                        title,
                        description,
                        exercise_type,
                        content,
                        audio_url,
                        language_id: language,
                        level_id: level,
                    },
                )
                .await?;
                println!("Exercise created: {:?}", exercise);
            }

            ExerciseCommands::AddQuestion {
                exercise_title,
                prompt,
                options,
                correct_answer,
            } => {
                let exercise_id: uuid::Uuid =
                    sqlx::query_scalar("SELECT id FROM exercises WHERE title = $1")
                        .bind(&exercise_title)
                        .fetch_one(mm.executor())
                        .await
                        .map_err(|e| DatabaseError::SqlxError(e))?;

                let question = Question::append(
                    &mm,
                    &actor,
                    exercise_id,
                    QuestionCreate {
                        prompt,
                        options,
                        correct_answer,
                    },
                )
                .await?;
                println!("Question created: {:?}", question);
            }
        },
    }

    Ok(())
}
