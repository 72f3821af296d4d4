use log::{debug, warn};
use morph::PartOfSpeech;

use super::{Origin, ResolvedWord, Resolver};
use crate::{
    cache::{CachedResolution, ResolutionKey},
    token::Token,
};

impl Resolver {
    /// Rescans the surface of a token nothing matched for words it contains,
    /// longest window first at each position.
    pub async fn rescue(&self, token: &Token) -> Vec<ResolvedWord> {
        let key = ResolutionKey::rescue_of(token);
        match self.cache.get_resolution(&key).await {
            Ok(Some(CachedResolution::Missing)) => return vec![],
            Ok(_) => {}
            Err(e) => warn!("resolution cache read failed: {}", e),
        }

        let chars: Vec<char> = token.surface.chars().collect();
        let mut words = vec![];
        let mut start = 0;
        while start < chars.len() {
            let longest = self.settings.rescue_window.min(chars.len() - start);
            let mut advanced = false;
            for len in (1..=longest).rev() {
                let text: String = chars[start..start + len].iter().collect();
                let mut candidate = Token::new(&text, PartOfSpeech::Unknown);
                candidate.person_name_context = token.person_name_context;
                let found = match self.direct_lookup(&candidate, Origin::Rescue).await {
                    Ok(Some(found)) => Some(found),
                    Ok(None) => self.conjugation_lookup(&candidate, Origin::Rescue).await.unwrap_or_else(|e| {
                        warn!("rescue of {} failed: {}", text, e);
                        None
                    }),
                    Err(e) => {
                        warn!("rescue of {} failed: {}", text, e);
                        None
                    }
                };
                if let Some(found) = found {
                    let mut word = ResolvedWord::new(&candidate, found.entry.id, found.reading_index, found.conjugations, Origin::Rescue);
                    word.pos = [token.pos].into_iter().collect();
                    words.push(word);
                    start += len;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                start += 1;
            }
        }

        if words.is_empty() {
            if let Err(e) = self.cache.set_resolution(key, CachedResolution::Missing).await {
                warn!("resolution cache write failed: {}", e);
            }
        } else {
            debug!("rescued {} words from {}", words.len(), token.surface);
        }
        words
    }
}
