//! Message catalog: `(code, English, French)`.
//!
//! Codes are grouped by feature. Enum labels use `enum.{Type}.{VALUE}` and
//! notification templates `notification.{type}` with `{name}` / `{title}`
//! placeholders.

pub const CATALOG: &[(&str, &str, &str)] = &[
    // General
    ("internal.server.error", "An unexpected error occurred", "Une erreur inattendue s'est produite"),
    ("validation.failed", "Some fields are invalid", "Certains champs sont invalides"),
    ("rate.limited", "Too many requests, slow down", "Trop de requêtes, ralentissez"),
    ("external.service.unavailable", "An external service is unavailable", "Un service externe est indisponible"),
    ("not.allowed", "You are not allowed to do this", "Vous n'êtes pas autorisé à faire ceci"),
    ("route.not.found", "Resource not found", "Ressource introuvable"),
    ("payload.invalid", "The request body is invalid", "Le corps de la requête est invalide"),
    ("invalid.id", "Invalid identifier", "Identifiant invalide"),
    ("comment.too.long", "Comment is too long", "Le commentaire est trop long"),
    ("tags.too.long", "Tags are too long", "Les étiquettes sont trop longues"),
    ("url.invalid", "Invalid URL", "URL invalide"),
    ("url.too.long", "URL is too long", "L'URL est trop longue"),
    ("google.request.failed", "Google request failed", "La requête Google a échoué"),
    ("google.chat.unavailable", "Google Chat is unavailable", "Google Chat est indisponible"),
    // Authentication
    ("authentication.required", "Authentication is required", "Une authentification est requise"),
    ("invalid.credentials", "Invalid email address or password", "Adresse e-mail ou mot de passe invalide"),
    ("invalid.token", "Invalid or missing token", "Jeton invalide ou manquant"),
    ("token.expired", "Token has expired", "Le jeton a expiré"),
    ("invalid.refresh.token", "Invalid refresh token", "Jeton de rafraîchissement invalide"),
    ("refresh.token.required", "Refresh token is required", "Le jeton de rafraîchissement est requis"),
    ("password.incorrect", "Current password is incorrect", "Le mot de passe actuel est incorrect"),
    ("password.length", "Password must be 8 to 128 characters", "Le mot de passe doit contenir 8 à 128 caractères"),
    ("password.required", "Password is required", "Le mot de passe est requis"),
    ("recaptcha.invalid", "Captcha verification failed", "La vérification captcha a échoué"),
    ("recaptcha.too.many.attempts", "Too many failed captcha attempts", "Trop de tentatives captcha échouées"),
    // Member
    ("member.not.found", "Member not found", "Membre introuvable"),
    ("member.banned", "This account has been banned", "Ce compte a été banni"),
    ("member.email.or.username.exists", "Email address or username already in use", "Adresse e-mail ou nom d'utilisateur déjà utilisé"),
    ("email.address.already.exists", "Email address already in use", "Adresse e-mail déjà utilisée"),
    ("email.address.invalid", "Invalid email address", "Adresse e-mail invalide"),
    ("email.address.too.long", "Email address is too long", "L'adresse e-mail est trop longue"),
    ("email.invalid", "Invalid email address", "Adresse e-mail invalide"),
    ("username.already.exists", "Username already in use", "Nom d'utilisateur déjà utilisé"),
    ("username.length", "Username must be 3 to 50 characters", "Le nom d'utilisateur doit contenir 3 à 50 caractères"),
    ("first.name.length", "First name must be 1 to 100 characters", "Le prénom doit contenir 1 à 100 caractères"),
    ("last.name.length", "Last name must be 1 to 100 characters", "Le nom doit contenir 1 à 100 caractères"),
    ("phone.number.length", "Invalid phone number length", "Longueur du numéro de téléphone invalide"),
    ("phone.number.too.long", "Phone number is too long", "Le numéro de téléphone est trop long"),
    // Country
    ("country.not.found", "Country not found", "Pays introuvable"),
    ("country.code.invalid", "Country code must have two letters", "Le code pays doit comporter deux lettres"),
    ("country.code.length", "Country code must have two letters", "Le code pays doit comporter deux lettres"),
    // Chat space
    ("chat.space.not.found", "Chat space not found", "Espace de discussion introuvable"),
    ("chat.space.title.length", "Title must be 1 to 300 characters", "Le titre doit contenir 1 à 300 caractères"),
    ("chat.space.description.length", "Description must be 1 to 3000 characters", "La description doit contenir 1 à 3000 caractères"),
    ("chat.space.guidelines.too.long", "Guidelines are too long", "Les règles sont trop longues"),
    ("chat.space.inactive", "Chat space is inactive", "L'espace de discussion est inactif"),
    ("chat.space.not.admin", "Only chat space admins can do this", "Seuls les administrateurs de l'espace peuvent faire ceci"),
    ("chat.space.not.organizer", "Only the organizer can do this", "Seul l'organisateur peut faire ceci"),
    ("chat.space.private.request.to.join", "This chat space is private, request to join instead", "Cet espace est privé, demandez à le rejoindre"),
    ("chat.space.already.joined", "You are already a member", "Vous êtes déjà membre"),
    ("chat.space.join.request.already.pending", "Your request to join is pending", "Votre demande d'adhésion est en attente"),
    ("chat.space.join.request.not.found", "Join request not found", "Demande d'adhésion introuvable"),
    ("chat.space.member.removed", "You have been removed from this chat space", "Vous avez été retiré de cet espace"),
    ("chat.space.member.not.removed", "Member has not been removed", "Le membre n'a pas été retiré"),
    ("chat.space.member.already.admin", "Member is already an admin", "Le membre est déjà administrateur"),
    ("chat.space.member.not.admin", "Member is not an admin", "Le membre n'est pas administrateur"),
    ("chat.space.members.only", "Only members can see this", "Seuls les membres peuvent voir ceci"),
    ("chat.space.not.a.member", "Not a member of this chat space", "Pas membre de cet espace"),
    ("chat.space.organizer.cannot.leave", "The organizer cannot leave the chat space", "L'organisateur ne peut pas quitter l'espace"),
    ("chat.space.cannot.remove.organizer", "The organizer cannot be removed", "L'organisateur ne peut pas être retiré"),
    ("chat.space.cannot.demote.organizer", "The organizer cannot be demoted", "L'organisateur ne peut pas être rétrogradé"),
    // Stream
    ("stream.not.found", "Stream not found", "Diffusion introuvable"),
    ("stream.title.length", "Title must be 1 to 500 characters", "Le titre doit contenir 1 à 500 caractères"),
    ("stream.description.length", "Description must be 1 to 3000 characters", "La description doit contenir 1 à 3000 caractères"),
    ("stream.location.length", "Location must be 1 to 400 characters", "Le lieu doit contenir 1 à 400 caractères"),
    ("stream.organizer.alias.too.long", "Organizer alias is too long", "L'alias de l'organisateur est trop long"),
    ("stream.invalid.timezone", "Invalid timezone", "Fuseau horaire invalide"),
    ("stream.start.in.past", "Start date must be in the future", "La date de début doit être dans le futur"),
    ("stream.start.must.precede.end", "Start date must be before end date", "La date de début doit précéder la date de fin"),
    ("stream.not.organizer", "Only the organizer can do this", "Seul l'organisateur peut faire ceci"),
    ("stream.cancelled", "This stream has been cancelled", "Cette diffusion a été annulée"),
    ("stream.ended", "This stream has ended", "Cette diffusion est terminée"),
    ("stream.private.request.to.join", "This stream is private, request to join instead", "Cette diffusion est privée, demandez à y participer"),
    ("stream.already.attending", "You are already attending", "Vous participez déjà"),
    ("stream.join.request.already.pending", "Your request to join is pending", "Votre demande de participation est en attente"),
    ("stream.join.request.not.found", "Join request not found", "Demande de participation introuvable"),
    ("stream.not.attending", "You are not attending this stream", "Vous ne participez pas à cette diffusion"),
    ("stream.organizer.cannot.leave", "The organizer cannot stop attending", "L'organisateur ne peut pas se retirer"),
    ("stream.attendees.only", "Only attendees can see this", "Seuls les participants peuvent voir ceci"),
    // Calendar
    ("calendar.not.found", "Calendar not found", "Calendrier introuvable"),
    ("calendar.title.length", "Title must be 1 to 300 characters", "Le titre doit contenir 1 à 300 caractères"),
    ("calendar.description.too.long", "Description is too long", "La description est trop longue"),
    ("calendar.timezone.invalid", "Invalid timezone", "Fuseau horaire invalide"),
    ("calendar.code.exists", "A calendar already exists for this country", "Un calendrier existe déjà pour ce pays"),
    ("calendar.already.exists", "A calendar already exists for this country", "Un calendrier existe déjà pour ce pays"),
    ("calendar.already.active", "Calendar is already active", "Le calendrier est déjà actif"),
    ("calendar.already.inactive", "Calendar is already inactive", "Le calendrier est déjà inactif"),
    ("calendar.not.synced", "Calendar is not linked to Google", "Le calendrier n'est pas lié à Google"),
    // OAuth2
    ("oauth2.invalid.state", "Authorization request expired or unknown", "Demande d'autorisation expirée ou inconnue"),
    ("oauth2.invalid.authorization.code", "Invalid authorization code", "Code d'autorisation invalide"),
    ("oauth2.invalid.refresh.token", "Stored refresh token was rejected", "Le jeton de rafraîchissement a été refusé"),
    ("oauth2.authorization.not.found", "No authorization for this service", "Aucune autorisation pour ce service"),
    ("oauth2.refresh.token.not.found", "No refresh token stored for this service", "Aucun jeton de rafraîchissement pour ce service"),
    // Social
    ("contact.type.duplicate", "Each contact type can only be given once", "Chaque type de contact ne peut être donné qu'une fois"),
    ("contact.value.length", "Contact value must be 1 to 500 characters", "La valeur du contact doit contenir 1 à 500 caractères"),
    ("contacts.too.many", "Too many contacts", "Trop de contacts"),
    ("follower.cannot.follow.self", "You cannot follow yourself", "Vous ne pouvez pas vous suivre vous-même"),
    ("follower.already.following", "You already follow this member", "Vous suivez déjà ce membre"),
    ("already.following", "You already follow this member", "Vous suivez déjà ce membre"),
    ("follower.not.following", "You do not follow this member", "Vous ne suivez pas ce membre"),
    ("follower.blocked", "You cannot follow this member", "Vous ne pouvez pas suivre ce membre"),
    ("block.user.cannot.block.self", "You cannot block yourself", "Vous ne pouvez pas vous bloquer vous-même"),
    // Engagement
    ("like.parent.not.found", "Nothing to like here", "Rien à aimer ici"),
    ("like.parent.type.unsupported", "This cannot be liked", "Ceci ne peut pas être aimé"),
    ("bookmark.not.found", "Bookmark not found", "Favori introuvable"),
    ("bookmark.already.exists", "Already bookmarked", "Déjà dans les favoris"),
    ("bookmark.parent.not.found", "Nothing to bookmark here", "Rien à ajouter aux favoris"),
    ("bookmark.parent.type.unsupported", "This cannot be bookmarked", "Ceci ne peut pas être ajouté aux favoris"),
    ("link.not.allowed", "You cannot manage these links", "Vous ne pouvez pas gérer ces liens"),
    ("link.parent.type.unsupported", "Links cannot be attached here", "Les liens ne peuvent pas être ajoutés ici"),
    ("link.type.duplicate", "Each link type can only be given once", "Chaque type de lien ne peut être donné qu'une fois"),
    ("links.too.many", "Too many links", "Trop de liens"),
    ("review.not.found", "Review not found", "Avis introuvable"),
    ("review.already.exists", "You have already reviewed this stream", "Vous avez déjà évalué cette diffusion"),
    ("review.rating.range", "Rating must be between 1 and 5", "La note doit être comprise entre 1 et 5"),
    ("review.comment.too.long", "Review comment is too long", "Le commentaire est trop long"),
    ("review.stream.not.ended", "Streams can be reviewed once they end", "Une diffusion ne peut être évaluée qu'après sa fin"),
    ("review.not.an.attendee", "Only attendees can review", "Seuls les participants peuvent évaluer"),
    ("review.organizer.cannot.review", "Organizers cannot review their own stream", "L'organisateur ne peut pas évaluer sa propre diffusion"),
    ("review.not.reviewer", "Only the reviewer can do this", "Seul l'auteur de l'avis peut faire ceci"),
    // Notification
    ("notification.not.found", "Notification not found", "Notification introuvable"),
    ("notification.followed.you", "{name} started following you", "{name} a commencé à vous suivre"),
    ("notification.chat.space.join.request", "{name} requested to join {title}", "{name} a demandé à rejoindre {title}"),
    ("notification.chat.space.join.approved", "Your request to join {title} was approved", "Votre demande pour rejoindre {title} a été approuvée"),
    ("notification.chat.space.join.disapproved", "Your request to join {title} was declined", "Votre demande pour rejoindre {title} a été refusée"),
    ("notification.stream.join.request", "{name} requested to attend {title}", "{name} a demandé à participer à {title}"),
    ("notification.stream.join.approved", "Your request to attend {title} was approved", "Votre demande de participation à {title} a été approuvée"),
    ("notification.stream.join.disapproved", "Your request to attend {title} was declined", "Votre demande de participation à {title} a été refusée"),
    ("notification.stream.cancelled", "{title} has been cancelled", "{title} a été annulé"),
    ("notification.soft.ask.answered", "{name} answered {title}", "{name} a répondu à {title}"),
    ("notification.soft.ask.replied", "{name} replied to your answer on {title}", "{name} a répondu à votre réponse sur {title}"),
    ("notification.review.received", "{name} reviewed {title}", "{name} a évalué {title}"),
    // Soft ask
    ("soft.ask.not.found", "Soft ask not found", "Question introuvable"),
    ("soft.ask.answer.not.found", "Answer not found", "Réponse introuvable"),
    ("soft.ask.reply.not.found", "Reply not found", "Réplique introuvable"),
    ("soft.ask.vote.parent.not.found", "Nothing to vote on here", "Rien à voter ici"),
    ("soft.ask.title.length", "Title must be 1 to 500 characters", "Le titre doit contenir 1 à 500 caractères"),
    ("soft.ask.description.length", "Description must be 1 to 3000 characters", "La description doit contenir 1 à 3000 caractères"),
    ("soft.ask.content.length", "Content must be 1 to 3000 characters", "Le contenu doit contenir 1 à 3000 caractères"),
    ("soft.ask.not.author", "Only the author can do this", "Seul l'auteur peut faire ceci"),
    ("soft.ask.closed", "This soft ask no longer accepts answers", "Cette question n'accepte plus de réponses"),
    ("soft.ask.deadline.in.past", "Deadline must be in the future", "La date limite doit être dans le futur"),
    ("soft.ask.parent.incomplete", "Parent type and id must be given together", "Le type et l'identifiant du parent vont ensemble"),
    ("soft.ask.parent.type.unsupported", "Soft asks cannot be attached here", "Les questions ne peuvent pas être ajoutées ici"),
    ("soft.ask.parent.not.found", "Parent not found", "Parent introuvable"),
    ("soft.ask.not.chat.space.member", "Only chat space members can ask here", "Seuls les membres de l'espace peuvent poser une question ici"),
    ("soft.ask.reply.parent.mismatch", "That reply belongs to another answer", "Cette réplique appartient à une autre réponse"),
    // Poll
    ("poll.not.found", "Poll not found", "Sondage introuvable"),
    ("poll.question.length", "Question must be 1 to 500 characters", "La question doit contenir 1 à 500 caractères"),
    ("poll.description.too.long", "Description is too long", "La description est trop longue"),
    ("poll.options.count", "A poll needs 2 to 10 options", "Un sondage nécessite 2 à 10 options"),
    ("poll.options.invalid", "Options must be 2 to 10 distinct, non-empty texts", "Les options doivent être 2 à 10 textes distincts et non vides"),
    ("poll.option.required", "Choose at least one option", "Choisissez au moins une option"),
    ("poll.option.unknown", "Unknown poll option", "Option de sondage inconnue"),
    ("poll.single.choice", "This poll accepts a single choice", "Ce sondage n'accepte qu'un seul choix"),
    ("poll.ended", "This poll has ended", "Ce sondage est terminé"),
    ("poll.expiry.in.past", "Expiry must be in the future", "L'expiration doit être dans le futur"),
    ("poll.not.author", "Only the author can do this", "Seul l'auteur peut faire ceci"),
    ("poll.parent.incomplete", "Parent type and id must be given together", "Le type et l'identifiant du parent vont ensemble"),
    ("poll.parent.type.unsupported", "Polls cannot be attached here", "Les sondages ne peuvent pas être ajoutés ici"),
    ("poll.parent.not.found", "Parent not found", "Parent introuvable"),
    ("poll.not.chat.space.member", "Only chat space members can create polls here", "Seuls les membres de l'espace peuvent créer un sondage ici"),
    // Business
    ("business.not.found", "Business not found", "Entreprise introuvable"),
    ("business.not.owner", "Only the owner can do this", "Seul le propriétaire peut faire ceci"),
    ("business.title.length", "Title must be 1 to 300 characters", "Le titre doit contenir 1 à 300 caractères"),
    ("business.motto.too.long", "Motto is too long", "La devise est trop longue"),
    ("business.description.length", "Description must be 1 to 3000 characters", "La description doit contenir 1 à 3000 caractères"),
    ("business.type.length", "Business type must be 1 to 100 characters", "Le type d'entreprise doit contenir 1 à 100 caractères"),
    ("business.address.too.long", "Address is too long", "L'adresse est trop longue"),
    ("business.founding.year.invalid", "Invalid founding year", "Année de création invalide"),
    ("business.registration.number.too.long", "Registration number is too long", "Le numéro d'enregistrement est trop long"),
    // Confirmations
    ("password.changed", "Password changed", "Mot de passe modifié"),
    ("chat.space.joined", "You joined the chat space", "Vous avez rejoint l'espace de discussion"),
    ("chat.space.join.requested", "Your request to join has been sent", "Votre demande d'adhésion a été envoyée"),
    ("chat.space.join.request.processed", "Join request processed", "Demande d'adhésion traitée"),
    ("chat.space.left", "You left the chat space", "Vous avez quitté l'espace de discussion"),
    ("chat.space.member.removal.done", "Member removed", "Membre retiré"),
    ("chat.space.member.restored", "Member restored", "Membre réintégré"),
    ("chat.space.admin.promoted", "Member promoted to admin", "Membre promu administrateur"),
    ("chat.space.admin.demoted", "Admin demoted to member", "Administrateur rétrogradé"),
    ("stream.joined", "You are attending this stream", "Vous participez à cette diffusion"),
    ("stream.join.requested", "Your request to attend has been sent", "Votre demande de participation a été envoyée"),
    ("stream.join.request.processed", "Attendance request processed", "Demande de participation traitée"),
    ("stream.attendance.withdrawn", "You are no longer attending", "Vous ne participez plus"),
    ("calendar.shared", "Calendar shared", "Calendrier partagé"),
    ("member.blocked", "Member blocked", "Membre bloqué"),
    ("member.unblocked", "Member unblocked", "Membre débloqué"),
    ("oauth2.service.invalid", "Unknown Google service", "Service Google inconnu"),
    // Enum labels
    ("enum.Visibility.PUBLIC", "Public", "Public"),
    ("enum.Visibility.PRIVATE", "Private", "Privé"),
    ("enum.ParentType.CHAT_SPACE", "Chat space", "Espace de discussion"),
    ("enum.ParentType.STREAM", "Stream", "Diffusion"),
    ("enum.ParentType.SOFT_ASK", "Soft ask", "Question"),
    ("enum.ParentType.BUSINESS", "Business", "Entreprise"),
    ("enum.RequestToJoinStatus.PENDING", "Pending", "En attente"),
    ("enum.RequestToJoinStatus.APPROVED", "Approved", "Approuvé"),
    ("enum.RequestToJoinStatus.DISAPPROVED", "Disapproved", "Refusé"),
    ("enum.JoinDecision.APPROVED", "Approved", "Approuvé"),
    ("enum.JoinDecision.DISAPPROVED", "Disapproved", "Refusé"),
    ("enum.JoinStatus.JOIN_CHAT_SPACE", "Join chat space", "Rejoindre l'espace"),
    ("enum.JoinStatus.REQUEST_TO_JOIN", "Request to join", "Demander à rejoindre"),
    ("enum.JoinStatus.PENDING", "Pending", "En attente"),
    ("enum.JoinStatus.DISAPPROVED", "Disapproved", "Refusé"),
    ("enum.JoinStatus.JOINED", "Joined", "Membre"),
    ("enum.JoinStatus.REMOVED", "Removed", "Retiré"),
    ("enum.AttendanceStatus.NOT_ATTENDING", "Not attending", "Ne participe pas"),
    ("enum.AttendanceStatus.PENDING", "Pending", "En attente"),
    ("enum.AttendanceStatus.APPROVED", "Attending", "Participe"),
    ("enum.AttendanceStatus.DISAPPROVED", "Disapproved", "Refusé"),
    ("enum.ChatSpaceStatus.ACTIVE", "Active", "Actif"),
    ("enum.ChatSpaceStatus.INACTIVE", "Inactive", "Inactif"),
    ("enum.ChatSpaceRole.ADMIN", "Admin", "Administrateur"),
    ("enum.ChatSpaceRole.MEMBER", "Member", "Membre"),
    ("enum.StreamType.EVENT", "Event", "Événement"),
    ("enum.StreamType.LIVE_STREAM", "Live stream", "Diffusion en direct"),
    ("enum.StreamSource.GOOGLE_MEET", "Google Meet", "Google Meet"),
    ("enum.StreamSource.YOUTUBE", "YouTube", "YouTube"),
    ("enum.StreamStatus.ACTIVE", "Active", "Actif"),
    ("enum.StreamStatus.CANCELLED", "Cancelled", "Annulé"),
    ("enum.StreamTimeFilter.UPCOMING", "Upcoming", "À venir"),
    ("enum.StreamTimeFilter.PAST", "Past", "Passé"),
    ("enum.StreamTimeFilter.LIVE", "Live", "En direct"),
    ("enum.Oauth2ServiceType.GOOGLE_CALENDAR", "Google Calendar", "Google Agenda"),
    ("enum.Oauth2ServiceType.GOOGLE_CHAT", "Google Chat", "Google Chat"),
    ("enum.Oauth2ServiceType.YOUTUBE", "YouTube", "YouTube"),
    ("enum.ContactType.EMAIL", "Email", "E-mail"),
    ("enum.ContactType.PHONE_NUMBER", "Phone number", "Numéro de téléphone"),
    ("enum.ContactType.WHATSAPP", "WhatsApp", "WhatsApp"),
    ("enum.ContactType.TELEGRAM", "Telegram", "Telegram"),
    ("enum.ContactType.FACEBOOK", "Facebook", "Facebook"),
    ("enum.ContactType.INSTAGRAM", "Instagram", "Instagram"),
    ("enum.ContactType.X", "X", "X"),
    ("enum.BlockStatus.BLOCKED", "Blocked", "Bloqué"),
    ("enum.BlockStatus.UNBLOCKED", "Unblocked", "Débloqué"),
    ("enum.LikeType.LIKE", "Like", "J'aime"),
    ("enum.LikeType.UNLIKE", "Unlike", "Je n'aime plus"),
    ("enum.LinkType.WEBSITE", "Website", "Site web"),
    ("enum.LinkType.FACEBOOK", "Facebook", "Facebook"),
    ("enum.LinkType.INSTAGRAM", "Instagram", "Instagram"),
    ("enum.LinkType.X", "X", "X"),
    ("enum.LinkType.LINKEDIN", "LinkedIn", "LinkedIn"),
    ("enum.LinkType.YOUTUBE", "YouTube", "YouTube"),
    ("enum.LinkType.TIKTOK", "TikTok", "TikTok"),
    ("enum.LinkType.WHATSAPP", "WhatsApp", "WhatsApp"),
    ("enum.SoftAskVoteParent.SOFT_ASK", "Soft ask", "Question"),
    ("enum.SoftAskVoteParent.ANSWER", "Answer", "Réponse"),
    ("enum.SoftAskVoteParent.REPLY", "Reply", "Réplique"),
    ("enum.SoftAskVoteType.VOTED", "Voted", "Voté"),
    ("enum.SoftAskVoteType.NOT_VOTED", "Not voted", "Non voté"),
    ("enum.BusinessChannel.ONLINE", "Online", "En ligne"),
    ("enum.BusinessChannel.PHYSICAL", "Physical", "Physique"),
    ("enum.BusinessChannel.HYBRID", "Hybrid", "Hybride"),
    ("enum.BusinessStatus.ACTIVE", "Active", "Active"),
    ("enum.BusinessStatus.INACTIVE", "Inactive", "Inactive"),
    ("enum.NotificationType.FOLLOWED_YOU", "New follower", "Nouvel abonné"),
    ("enum.NotificationType.CHAT_SPACE_JOIN_REQUEST", "Join request", "Demande d'adhésion"),
    ("enum.NotificationType.CHAT_SPACE_JOIN_APPROVED", "Join approved", "Adhésion approuvée"),
    ("enum.NotificationType.CHAT_SPACE_JOIN_DISAPPROVED", "Join declined", "Adhésion refusée"),
    ("enum.NotificationType.STREAM_JOIN_REQUEST", "Attendance request", "Demande de participation"),
    ("enum.NotificationType.STREAM_JOIN_APPROVED", "Attendance approved", "Participation approuvée"),
    ("enum.NotificationType.STREAM_JOIN_DISAPPROVED", "Attendance declined", "Participation refusée"),
    ("enum.NotificationType.STREAM_CANCELLED", "Stream cancelled", "Diffusion annulée"),
    ("enum.NotificationType.SOFT_ASK_ANSWERED", "New answer", "Nouvelle réponse"),
    ("enum.NotificationType.SOFT_ASK_REPLIED", "New reply", "Nouvelle réplique"),
    ("enum.NotificationType.REVIEW_RECEIVED", "New review", "Nouvel avis"),
    ("enum.Role.USER", "User", "Utilisateur"),
    ("enum.Role.ADMINISTRATOR", "Administrator", "Administrateur"),
    ("enum.Role.SUPER_ADMINISTRATOR", "Super administrator", "Super administrateur"),
    ("enum.ProfileStatus.ACTIVE", "Active", "Actif"),
    ("enum.ProfileStatus.INACTIVE", "Inactive", "Inactif"),
    ("enum.ProfileStatus.BANNED", "Banned", "Banni"),
    ("enum.VerificationStatus.PENDING", "Pending", "En attente"),
    ("enum.VerificationStatus.APPROVED", "Approved", "Approuvé"),
    ("enum.VerificationStatus.DISAPPROVED", "Disapproved", "Refusé"),
    ("enum.Gender.MALE", "Male", "Homme"),
    ("enum.Gender.FEMALE", "Female", "Femme"),
    ("enum.Gender.OTHER", "Other", "Autre"),
];
