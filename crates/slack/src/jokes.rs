//! The demo `/joke` command: answers with a random GIF, but only when asked nicely.

use rand::seq::SliceRandom;

use crate::commands::{SlashCommandRequest, SlashCommandResponse};

pub const JOKE_COMMAND: &str = "/joke";
pub const MAGIC_WORD: &str = "please";
pub const MAGIC_WORD_PROMPT: &str = "What's the magic word?";

pub const JOKE_GIFS: &[&str] = &[
    "http://i.giphy.com/Ed3Jpty9JPnPO.gif",
    "http://i.giphy.com/3o7abAsUDj5cOzuCJ2.gif",
    "http://i.giphy.com/9n9TI4yi4EkXC.gif",
    "http://i.giphy.com/xTk9ZLpqvjCb8JG1nG.gif",
    "http://i.giphy.com/o4yzmqAp9wuBy.gif",
    "http://i.giphy.com/K0Muoyvf8GSJO.gif",
    "http://i.giphy.com/qfsmPduiv9Uju.gif",
    "http://i.giphy.com/AsW6f24WSrG8w.gif",
    "http://i.giphy.com/B0UnR4nmWMFpK.gif",
    "http://i.giphy.com/GgyY6X9wk2dsk.gif",
    "http://i.giphy.com/i17L5UDJugaCA.gif",
    "http://i.giphy.com/Mc5ddN78OlTmo.gif",
    "http://i.giphy.com/slhay2qwQCiWs.gif",
    "http://i.giphy.com/OXJUIgxaX0loI.gif",
    "http://i.giphy.com/yjf25nyKCbB4I.gif",
    "http://i.giphy.com/w95g1K9Lu0guY.gif",
    "http://i.giphy.com/PpMaW39IQzNfO.gif",
    "http://i.giphy.com/t733NMVDCvB6M.gif",
    "http://i.giphy.com/uOYwaO5HlLTyM.gif",
    "http://i.giphy.com/tHWJUanyL2xS8.gif",
    "http://i.giphy.com/qGiVGk6i3ulpu.gif",
    "http://i.giphy.com/x4evbMlhpVNCw.gif",
    "http://i.giphy.com/t9x121JPbkEc8.gif",
];

pub fn joke_command(request: &SlashCommandRequest) -> SlashCommandResponse {
    // exact match, no trimming or case folding
    if request.text != MAGIC_WORD {
        return SlashCommandResponse::in_channel(MAGIC_WORD_PROMPT);
    }

    let gif = JOKE_GIFS.choose(&mut rand::thread_rng()).copied().unwrap_or(MAGIC_WORD_PROMPT);
    SlashCommandResponse::in_channel(gif)
}
