use std::{cell::RefCell, collections::HashSet, rc::Rc};

use subcommander::{
    handler_source,
    Caller,
    Commander,
    CompletionResult,
    HandlerResult,
    Hooks,
};
use tracing_subscriber::EnvFilter;

struct Player {
    name: String,
    op: bool,
    permissions: HashSet<String>,
    height: RefCell<i32>,
}

impl Player {
    fn new(name: &str, op: bool) -> Self {
        Player {
            name: name.to_owned(),
            op,
            permissions: HashSet::new(),
            height: RefCell::new(64),
        }
    }

    fn send_message(&self, message: impl AsRef<str>) {
        println!("[to {}] {}", self.name, message.as_ref());
    }
}

impl Caller for Player {
    fn is_privileged(&self) -> bool {
        self.op
    }

    fn has_capability(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }
}

struct Usage;

impl Hooks<Player> for Usage {
    fn on_not_a_subcommand(&self, player: &Player, _label: &str, _args: &[String]) {
        player.send_message("/test usage:");
        player.send_message("/test internal");
        player.send_message("/test external");
    }

    fn on_no_permission(&self, player: &Player, label: &str, _args: &[String]) {
        player.send_message(format!("You do not have permission to use /test {}", label));
    }
}

#[derive(Clone)]
struct Internal {
    online: Rc<Vec<String>>,
}

#[handler_source(Player)]
impl Internal {
    #[subcommand(name = "internal", alias("i", "int"), permission = "command.admin")]
    fn lift(&self, player: &Player, _label: &str, args: &[String]) -> HandlerResult {
        if let Some(target) = args.first() {
            if !self.online.contains(target) {
                player.send_message("That player is not online.");
                return Ok(());
            }
        }

        *player.height.borrow_mut() += 5;
        player.send_message("Whoosh!");
        Ok(())
    }

    #[complete(name = "internal")]
    fn online_players(&self, _player: &Player, _args: &[String]) -> CompletionResult {
        Ok(self.online.to_vec())
    }
}

#[derive(Clone)]
struct External;

#[handler_source(Player)]
impl External {
    #[subcommand(name = "external", alias("e", "ext"))]
    fn credits(player: &Player, _label: &str, _args: &[String]) -> HandlerResult {
        player.send_message("subcommander demo");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let online = Rc::new(vec!["Steve".to_owned(), "Alex".to_owned(), "Notch".to_owned()]);

    let mut commander = Commander::new(Usage);
    commander.register_source(&Internal { online })?;
    commander.register_source(&External)?;

    let op = Player::new("Steve", true);
    let guest = Player::new("Alex", false);

    commander.dispatch_line(&op, "int Alex")?;
    commander.dispatch_line(&guest, "internal")?;
    commander.dispatch_line(&guest, "ext")?;
    commander.dispatch_line(&guest, "nope")?;

    println!("{:?}", commander.complete_line(&guest, ""));
    println!("{:?}", commander.complete_line(&op, "i"));
    println!("{:?}", commander.complete_line(&op, "internal St"));

    Ok(())
}
