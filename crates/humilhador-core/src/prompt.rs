use crate::profile::Profile;
use crate::username::Username;

/// System message: who the model is pretending to be.
pub const ROAST_PERSONA: &str = "Você é um comediante stand-up especializado em fazer roasts \
divertidos sobre perfis de desenvolvedores. Use humor, sarcasmo leve e criatividade com emojis.";

pub const EMPTY_BIO_FALLBACK: &str = "Bio vazia, ou seja, a própria deep web do GitHub.";
pub const UNKNOWN_LOCATION_FALLBACK: &str = "Desconhecida, talvez Marte?";

const INSTRUCTIONS: &str = "Instruções:
1. Faça piadas com base nesses dados.
2. Use um tom sarcástico e engraçado, como se estivesse em um roast.
3. Use emojis para deixar mais divertido.
4. Exagere as conquistas ou falta delas com humor.
5. Seja criativo com a bio ou a falta dela.";

const TONE_EXAMPLE: &str = "Exemplo de tom:
\"Esse aqui tem 3 seguidores no GitHub e 47 repositórios com README vazio. Claramente um influenciador do código! 😎
A bio diz 'Fullstack developer', mas o único stack que ele lida é o de boletos no final do mês. 📉\"";

fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Build the user message for the roast. Never fails; missing fields get a joke instead.
pub fn compose_prompt(profile: &Profile, username: &Username) -> String {
    let name = or_fallback(profile.name.as_deref(), username.as_str());
    let bio = or_fallback(profile.bio.as_deref(), EMPTY_BIO_FALLBACK);
    let location = or_fallback(profile.location.as_deref(), UNKNOWN_LOCATION_FALLBACK);

    let mut prompt = String::new();

    prompt.push_str("Você é um comediante de stand-up e vai fazer um roast MUITO engraçado ");
    prompt.push_str("com base no seguinte perfil de desenvolvedor do GitHub.\n\n");

    prompt.push_str("Informações disponíveis:\n");
    prompt.push_str(&format!("- Nome: {}\n", name));
    prompt.push_str(&format!("- Bio: {}\n", bio));
    prompt.push_str(&format!("- Repositórios públicos: {}\n", profile.public_repos));
    prompt.push_str(&format!("- Seguidores: {}\n", profile.followers));
    prompt.push_str(&format!("- Seguindo: {}\n", profile.following));
    prompt.push_str(&format!("- Localização: {}\n", location));
    prompt.push_str(&format!("- Perfil: {}\n\n", profile.html_url));

    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(TONE_EXAMPLE);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octocat() -> Profile {
        Profile {
            name: Some("The Octocat".to_string()),
            bio: Some(String::new()),
            public_repos: 8,
            followers: 100,
            following: 9,
            location: None,
            html_url: "https://github.com/octocat".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".to_string(),
        }
    }

    #[test]
    fn test_octocat_prompt() {
        let username = Username::parse("octocat").unwrap();
        let prompt = compose_prompt(&octocat(), &username);

        assert!(prompt.contains("Bio vazia"));
        assert!(prompt.contains("- Nome: The Octocat\n"));
        assert!(prompt.contains("- Repositórios públicos: 8\n"));
        assert!(prompt.contains("- Seguidores: 100\n"));
        assert!(prompt.contains("- Seguindo: 9\n"));
        assert!(prompt.contains(UNKNOWN_LOCATION_FALLBACK));
        assert!(prompt.contains("https://github.com/octocat"));
    }

    #[test]
    fn test_empty_bio_never_rendered_blank() {
        let username = Username::parse("octocat").unwrap();
        for bio in [None, Some(""), Some("   ")] {
            let mut profile = octocat();
            profile.bio = bio.map(str::to_string);
            let prompt = compose_prompt(&profile, &username);
            assert!(prompt.contains(&format!("- Bio: {}\n", EMPTY_BIO_FALLBACK)));
            assert!(!prompt.contains("- Bio: \n"));
        }
    }

    #[test]
    fn test_missing_name_uses_username() {
        let username = Username::parse("octocat").unwrap();
        let mut profile = octocat();
        profile.name = None;
        profile.bio = Some("Fullstack developer".to_string());
        profile.location = Some("San Francisco".to_string());

        let prompt = compose_prompt(&profile, &username);
        assert!(prompt.contains("- Nome: octocat\n"));
        assert!(prompt.contains("- Bio: Fullstack developer\n"));
        assert!(prompt.contains("- Localização: San Francisco\n"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let username = Username::parse("octocat").unwrap();
        assert_eq!(compose_prompt(&octocat(), &username), compose_prompt(&octocat(), &username));
    }
}
